//! Table summarization and retention classification.
//!
//! `DocumentProcessor` calls [`LlmClient::summarize`] once per extracted table
//! and [`LlmClient::classify`] once per batch of summaries to decide which
//! tables are worth keeping.

use std::future::Future;

/// Summarizes and classifies table content.
///
/// Implementations typically wrap a single pooled HTTP client shared across
/// every process-stage worker (see the pipeline's concurrency model).
pub trait LlmClient: Send + Sync {
    /// Summarizes each table's HTML, in order. Returns one summary per input.
    fn summarize(
        &self,
        html: &[String],
        model: &str,
        tag: &str,
    ) -> impl Future<Output = crate::Result<Vec<String>>> + Send;

    /// Decides, per summary, whether the table is worth retaining.
    ///
    /// Returns one bool per input summary, same order.
    fn classify(
        &self,
        summaries: &[String],
        model: &str,
        tag: &str,
    ) -> impl Future<Output = crate::Result<Vec<bool>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockLlmClient;

    impl LlmClient for MockLlmClient {
        async fn summarize(
            &self,
            html: &[String],
            _model: &str,
            _tag: &str,
        ) -> crate::Result<Vec<String>> {
            Ok(html.iter().map(|h| format!("summary of {h}")).collect())
        }

        async fn classify(
            &self,
            summaries: &[String],
            _model: &str,
            _tag: &str,
        ) -> crate::Result<Vec<bool>> {
            Ok(summaries.iter().map(|s| !s.is_empty()).collect())
        }
    }

    #[tokio::test]
    async fn summarize_preserves_order() {
        let client = MockLlmClient;
        let html = vec!["<table>a</table>".to_string(), "<table>b</table>".to_string()];
        let summaries = client.summarize(&html, "gpt", "tables").await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].contains('a'));
        assert!(summaries[1].contains('b'));
    }

    #[tokio::test]
    async fn classify_one_bool_per_summary() {
        let client = MockLlmClient;
        let summaries = vec!["x".to_string(), String::new()];
        let kept = client.classify(&summaries, "gpt", "tables").await.unwrap();
        assert_eq!(kept, vec![true, false]);
    }
}
