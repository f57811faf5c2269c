//! The vector-store collaborator: the pipeline's only write path to the
//! actual retrieval backend.

use std::future::Future;

use docingest_core::EmbeddingModel;

use crate::types::CombinedDocument;

/// Loads combined documents into a retrieval backend, embedding each with
/// `embedder` and respecting `max_tokens` as the backend's own chunking
/// limit (distinct from the ingestion pipeline's own `TokenSplitter` budget).
pub trait VectorStore: Send + Sync {
    /// Embeds and inserts `documents`.
    fn insert(
        &self,
        documents: Vec<CombinedDocument>,
        embedder: &dyn EmbeddingModel,
        max_tokens: usize,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// The backend's collection/index name, surfaced in CLI/log output.
    fn index_name(&self) -> &str;

    /// Drops and recreates the backend's collection. Backs the `clean-db`
    /// subcommand.
    fn reset(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockEmbedder;

    impl EmbeddingModel for MockEmbedder {
        fn dim(&self) -> usize {
            4
        }

        async fn embed(&self, _text: &str) -> docingest_core::Result<Vec<f32>> {
            Ok(vec![0.0; 4])
        }
    }

    #[derive(Default)]
    struct MockVectorStore {
        inserted: Mutex<usize>,
    }

    impl VectorStore for MockVectorStore {
        async fn insert(
            &self,
            documents: Vec<CombinedDocument>,
            _embedder: &dyn EmbeddingModel,
            _max_tokens: usize,
        ) -> anyhow::Result<()> {
            *self.inserted.lock().unwrap() += documents.len();
            Ok(())
        }

        fn index_name(&self) -> &str {
            "mock"
        }

        async fn reset(&self) -> anyhow::Result<()> {
            *self.inserted.lock().unwrap() = 0;
            Ok(())
        }
    }

    #[tokio::test]
    async fn insert_tracks_document_count() {
        let store = MockVectorStore::default();
        let embedder = MockEmbedder;
        let docs = vec![CombinedDocument::text(
            "hello".to_string(),
            "doc.pdf".to_string(),
            "# Intro".to_string(),
        )];

        store.insert(docs, &embedder, 512).await.unwrap();
        assert_eq!(*store.inserted.lock().unwrap(), 1);

        store.reset().await.unwrap();
        assert_eq!(*store.inserted.lock().unwrap(), 0);
    }
}
