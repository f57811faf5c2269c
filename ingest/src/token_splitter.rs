//! Splits a string into token-bounded parts along sentence boundaries.

use unicode_segmentation::UnicodeSegmentation;

use docingest_core::Tokenizer;

/// Sentence-splits `text` and greedily packs sentences into parts that stay
/// under `max_tokens`, as counted by `tokenizer`.
///
/// When `overlap` is non-zero, a pack that overflows reseeds the next pack
/// with its own last sentence rather than starting empty. `overlap`'s
/// numeric value is otherwise unused — a boolean gate, not a token budget.
///
/// A single sentence whose own token count exceeds `max_tokens` is still
/// emitted as its own part; the splitter never subdivides a sentence.
pub async fn split(
    text: &str,
    tokenizer: &dyn Tokenizer,
    max_tokens: usize,
    overlap: usize,
) -> anyhow::Result<Vec<String>> {
    let sentences: Vec<&str> = text
        .unicode_sentences()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.is_empty() {
        return Ok(Vec::new());
    }

    let mut counts = Vec::with_capacity(sentences.len());
    for sentence in &sentences {
        counts.push(tokenizer.count(sentence).await?);
    }

    let mut parts = Vec::new();
    let mut pack: Vec<&str> = Vec::new();
    let mut pack_counts: Vec<usize> = Vec::new();
    let mut running = 0usize;

    for (&sentence, &count) in sentences.iter().zip(&counts) {
        if !pack.is_empty() && running + count > max_tokens {
            parts.push(pack.join(" "));

            if overlap > 0 {
                let last_sentence = *pack.last().expect("pack checked non-empty above");
                let last_count = *pack_counts.last().expect("pack checked non-empty above");
                pack.clear();
                pack_counts.clear();
                pack.push(last_sentence);
                pack_counts.push(last_count);
                running = last_count;
            } else {
                pack.clear();
                pack_counts.clear();
                running = 0;
            }
        }

        pack.push(sentence);
        pack_counts.push(count);
        running += count;
    }

    if !pack.is_empty() {
        parts.push(pack.join(" "));
    }

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WordCountTokenizer;

    impl Tokenizer for WordCountTokenizer {
        async fn count(&self, text: &str) -> docingest_core::Result<usize> {
            Ok(text.split_whitespace().count())
        }
    }

    #[tokio::test]
    async fn short_text_is_one_part() {
        let tokenizer = WordCountTokenizer;
        let parts = split("One short sentence.", &tokenizer, 512, 50)
            .await
            .unwrap();
        assert_eq!(parts, vec!["One short sentence.".to_string()]);
    }

    #[tokio::test]
    async fn overflowing_text_splits_into_multiple_parts() {
        let tokenizer = WordCountTokenizer;
        let text = "Alpha beta gamma delta. Epsilon zeta eta theta. Iota kappa lambda mu.";
        let parts = split(text, &tokenizer, 8, 0).await.unwrap();
        assert!(parts.len() > 1, "expected multiple parts, got {parts:?}");
    }

    #[tokio::test]
    async fn overlap_reseeds_next_part_with_last_sentence() {
        let tokenizer = WordCountTokenizer;
        let text = "Alpha beta gamma delta. Epsilon zeta eta theta. Iota kappa lambda mu.";
        let parts = split(text, &tokenizer, 8, 50).await.unwrap();
        assert!(parts.len() > 1);
        let second_sentence = "Epsilon zeta eta theta.";
        assert!(parts[1].starts_with(second_sentence));
    }

    #[tokio::test]
    async fn single_oversized_sentence_is_its_own_part() {
        let tokenizer = WordCountTokenizer;
        let text = "One two three four five six seven eight nine ten eleven twelve.";
        let parts = split(text, &tokenizer, 3, 0).await.unwrap();
        assert_eq!(parts.len(), 1);
    }

    #[tokio::test]
    async fn empty_text_produces_no_parts() {
        let tokenizer = WordCountTokenizer;
        let parts = split("   ", &tokenizer, 512, 50).await.unwrap();
        assert!(parts.is_empty());
    }
}
