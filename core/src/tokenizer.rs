//! Token counting against an embedding endpoint.
//!
//! [`TokenSplitter`](https://docs.rs/docingest-ingest) calls [`Tokenizer::count`]
//! once per sentence while greedily packing a chunk.

use std::future::Future;

/// Counts tokens in a string, as the target embedding model would tokenize it.
///
/// Token counts are advisory: the splitter's only guarantee is that a pack
/// contains at most one sentence that pushed it over budget.
pub trait Tokenizer: Send + Sync {
    /// Returns the token count for `text`.
    fn count(&self, text: &str) -> impl Future<Output = crate::Result<usize>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts whitespace-separated words as a stand-in for a real tokenizer.
    struct WordCountTokenizer;

    impl Tokenizer for WordCountTokenizer {
        async fn count(&self, text: &str) -> crate::Result<usize> {
            Ok(text.split_whitespace().count())
        }
    }

    #[tokio::test]
    async fn counts_words() {
        let tokenizer = WordCountTokenizer;
        assert_eq!(tokenizer.count("hello world").await.unwrap(), 2);
        assert_eq!(tokenizer.count("").await.unwrap(), 0);
    }
}
