//! Batch orchestration: page-count classification, bounded concurrent
//! convert/process/chunk stages, and aggregation into the vector store.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use docingest_core::{EmbeddingModel, LlmClient, Tokenizer};
use docingest_pdf::{Converter, DocumentProcessor};
use tokio::sync::Semaphore;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::cache::CacheLayer;
use crate::chunking::chunk_document;
use crate::combine::combine;
use crate::config::PipelineConfig;
use crate::error::{IngestError, Result};
use crate::types::CombinedDocument;
use crate::vector_store::VectorStore;

/// Per-document timings, kept regardless of `--debug` so the caller can
/// choose whether to render them.
#[derive(Debug, Clone, Default)]
pub struct StageTimings {
    /// Time spent in the convert stage (skipped entirely on a cache hit).
    pub convert: Duration,
    /// Time spent extracting structured text.
    pub text: Duration,
    /// Time spent summarizing and classifying tables.
    pub tables: Duration,
    /// Time spent chunking.
    pub chunk: Duration,
}

impl StageTimings {
    fn total(&self) -> Duration {
        self.convert + self.text + self.tables + self.chunk
    }
}

/// One document's outcome from a successful pipeline run.
#[derive(Debug, Clone)]
pub struct DocumentStats {
    /// The input PDF's path.
    pub path: PathBuf,
    /// Page count used for light/heavy classification.
    pub page_count: u32,
    /// Number of tables retained after LLM classification.
    pub table_count: usize,
    /// Number of chunks produced.
    pub chunk_count: usize,
    /// Per-stage timings.
    pub timings: StageTimings,
}

/// The outcome of a full pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Per-document stats for every document that made it through all stages.
    pub documents: Vec<DocumentStats>,
    /// Inputs dropped entirely, with a human-readable reason.
    pub skipped: Vec<(PathBuf, String)>,
}

impl PipelineReport {
    /// Renders an aligned stats table. The four per-stage timing columns are
    /// included only when `debug` is set.
    #[must_use]
    pub fn render(&self, debug: bool) -> String {
        let mut out = String::new();
        if debug {
            let _ = writeln!(
                out,
                "{:<40} {:>6} {:>7} {:>8} {:>9} {:>9} {:>9} {:>9} {:>9}",
                "file", "pages", "tables", "chunks", "convert", "text", "tables_s", "chunk", "total"
            );
        } else {
            let _ = writeln!(out, "{:<40} {:>6} {:>7} {:>8}", "file", "pages", "tables", "chunks");
        }

        for doc in &self.documents {
            let name = doc
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if debug {
                let _ = writeln!(
                    out,
                    "{:<40} {:>6} {:>7} {:>8} {:>8.2?} {:>8.2?} {:>8.2?} {:>8.2?} {:>8.2?}",
                    name,
                    doc.page_count,
                    doc.table_count,
                    doc.chunk_count,
                    doc.timings.convert,
                    doc.timings.text,
                    doc.timings.tables,
                    doc.timings.chunk,
                    doc.timings.total(),
                );
            } else {
                let _ = writeln!(out, "{:<40} {:>6} {:>7} {:>8}", name, doc.page_count, doc.table_count, doc.chunk_count);
            }
        }

        for (path, reason) in &self.skipped {
            let _ = writeln!(out, "skipped {}: {reason}", path.display());
        }

        out
    }
}

/// Orchestrates the full ingestion run: classify, convert/process/chunk in
/// two concurrency-bounded batches (light, then heavy), then aggregate every
/// surviving document into the vector store.
pub struct Pipeline {
    config: PipelineConfig,
    converter: Arc<dyn Converter>,
    llm: Arc<dyn LlmClient>,
    tokenizer: Arc<dyn Tokenizer>,
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingModel>,
    model: String,
    tag: String,
}

impl Clone for Pipeline {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            converter: self.converter.clone(),
            llm: self.llm.clone(),
            tokenizer: self.tokenizer.clone(),
            vector_store: self.vector_store.clone(),
            embedder: self.embedder.clone(),
            model: self.model.clone(),
            tag: self.tag.clone(),
        }
    }
}

impl Pipeline {
    /// Builds a pipeline from its collaborators and configuration.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: PipelineConfig,
        converter: Arc<dyn Converter>,
        llm: Arc<dyn LlmClient>,
        tokenizer: Arc<dyn Tokenizer>,
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingModel>,
        model: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            config,
            converter,
            llm,
            tokenizer,
            vector_store,
            embedder,
            model: model.into(),
            tag: tag.into(),
        }
    }

    /// Runs the full pipeline over `inputs`: page-count classification,
    /// light batch, heavy batch, then a single aggregated vector-store
    /// insert over every document that survived all four stages.
    pub async fn run(&self, inputs: Vec<PathBuf>) -> Result<PipelineReport> {
        let mut light = Vec::new();
        let mut heavy = Vec::new();
        let mut skipped = Vec::new();

        for path in inputs {
            match page_count(&path) {
                Ok(count) => {
                    if count >= self.config.heavy_page_threshold {
                        heavy.push((path, count));
                    } else {
                        light.push((path, count));
                    }
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "could not read page count, skipping");
                    skipped.push((path, err.to_string()));
                }
            }
        }

        info!(light = light.len(), heavy = heavy.len(), "classified batches");

        let mut documents = self.run_batch(light, self.config.batch_limit_light, &mut skipped).await;
        documents.extend(self.run_batch(heavy, self.config.batch_limit_heavy, &mut skipped).await);

        let mut combined = Vec::new();
        for doc in &documents {
            match self.load_combined(&doc.path) {
                Ok(docs) => combined.extend(docs),
                Err(err) => {
                    warn!(path = %doc.path.display(), %err, "failed to load sidecars for aggregation");
                    skipped.push((doc.path.clone(), err.to_string()));
                }
            }
        }

        self.insert_all(combined).await?;

        Ok(PipelineReport { documents, skipped })
    }

    async fn run_batch(
        &self,
        docs: Vec<(PathBuf, u32)>,
        limit: usize,
        skipped: &mut Vec<(PathBuf, String)>,
    ) -> Vec<DocumentStats> {
        if docs.is_empty() {
            return Vec::new();
        }

        let worker_count = limit.min(docs.len()).max(1);
        let pool = match rayon::ThreadPoolBuilder::new().num_threads(worker_count).build() {
            Ok(pool) => Arc::new(pool),
            Err(err) => {
                warn!(%err, "failed to build converter thread pool, skipping batch");
                for (path, _) in docs {
                    skipped.push((path, err.to_string()));
                }
                return Vec::new();
            }
        };

        let semaphore = Arc::new(Semaphore::new(worker_count));
        let mut handles = Vec::new();
        for (path, count) in docs {
            let permits = semaphore.clone();
            let pipeline = self.clone();
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permits.acquire_owned().await.expect("semaphore is never closed");
                let span = info_span!("document", path = %path.display());
                let result = pipeline.process_document(&path, count, &pool).instrument(span).await;
                (path, result)
            }));
        }

        let mut stats = Vec::new();
        for handle in handles {
            match handle.await {
                Ok((path, Ok(stat))) => stats.push(stat),
                Ok((path, Err(err))) => {
                    warn!(path = %path.display(), %err, "document failed, dropping from run");
                    skipped.push((path, err.to_string()));
                }
                Err(join_err) => {
                    warn!(%join_err, "worker task panicked");
                }
            }
        }

        stats
    }

    async fn process_document(&self, path: &Path, page_count: u32, pool: &rayon::ThreadPool) -> Result<DocumentStats> {
        let cache = CacheLayer::new(path, self.config.cache_root.clone());
        let force = cache.needs_conversion(path)?;
        let mut timings = StageTimings::default();

        debug!(force, "conversion cache decision");
        let tree = if force {
            let start = Instant::now();
            let tree = self.convert_one(path, pool).await?;
            timings.convert = start.elapsed();
            cache.write_checksum(path)?;
            cache.write_json(&cache.converted_path(), &tree)?;
            tree
        } else {
            cache.read_json(&cache.converted_path())?
        };

        let owned = DocumentProcessor::open(path).map_err(|source| IngestError::Structure {
            path: path.to_path_buf(),
            source,
        })?;
        let processor = owned.processor();

        let text_cache_hit = !force && cache.has_text();
        debug!(hit = text_cache_hit, "text sidecar cache decision");
        let elements = if force || !cache.has_text() {
            let start = Instant::now();
            let elements = processor.extract_text(&tree, self.config.fuzzy_threshold);
            timings.text = start.elapsed();
            cache.write_json(&cache.text_path(), &elements)?;
            elements
        } else {
            cache.read_json(&cache.text_path())?
        };

        let table_cache_hit = !force && cache.has_table();
        debug!(hit = table_cache_hit, "table sidecar cache decision");
        let tables = if force || !cache.has_table() {
            let start = Instant::now();
            let tables = processor
                .extract_tables(&tree, self.llm.as_ref(), &self.model, &self.tag)
                .await
                .map_err(|source| IngestError::Structure {
                    path: path.to_path_buf(),
                    source,
                })?;
            timings.tables = start.elapsed();
            cache.write_json(&cache.table_path(), &tables)?;
            tables
        } else {
            cache.read_json(&cache.table_path())?
        };

        let chunks_cache_hit = !force && cache.has_chunks();
        debug!(hit = chunks_cache_hit, "chunk sidecar cache decision");
        let chunks = if force || !cache.has_chunks() {
            let start = Instant::now();
            let chunks = chunk_document(&elements, self.tokenizer.as_ref(), self.config.max_tokens, self.config.overlap)
                .await
                .map_err(|source| IngestError::Chunk {
                    path: path.to_path_buf(),
                    reason: source.to_string(),
                })?;
            timings.chunk = start.elapsed();
            cache.write_json(&cache.chunks_path(), &chunks)?;
            chunks
        } else {
            cache.read_json(&cache.chunks_path())?
        };

        Ok(DocumentStats {
            path: path.to_path_buf(),
            page_count,
            table_count: tables.len(),
            chunk_count: chunks.len(),
            timings,
        })
    }

    /// Bridges the async `Converter` collaborator into `pool`'s dedicated OS
    /// threads, so a slow converter on one document cannot starve the
    /// runtime's other async stages.
    async fn convert_one(&self, path: &Path, pool: &rayon::ThreadPool) -> Result<docingest_pdf::DocumentTree> {
        let converter = self.converter.clone();
        let handle = tokio::runtime::Handle::current();
        let (tx, rx) = tokio::sync::oneshot::channel();
        let path = path.to_path_buf();
        let path_for_worker = path.clone();

        pool.spawn(move || {
            let result = handle.block_on(converter.convert(&path_for_worker));
            let _ = tx.send(result);
        });

        rx.await
            .map_err(|_| IngestError::Rejected(format!("converter worker for {} was dropped", path.display())))?
            .map_err(|source| IngestError::Conversion { path, source })
    }

    fn load_combined(&self, path: &Path) -> Result<Vec<CombinedDocument>> {
        let cache = CacheLayer::new(path, self.config.cache_root.clone());
        let chunks = cache.read_json(&cache.chunks_path())?;
        let tables = if cache.has_table() {
            cache.read_json(&cache.table_path())?
        } else {
            std::collections::HashMap::new()
        };
        let filename = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        Ok(combine(&chunks, &tables, &filename))
    }

    async fn insert_all(&self, documents: Vec<CombinedDocument>) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }
        self.vector_store
            .insert(documents, self.embedder.as_ref(), self.config.max_tokens)
            .await
            .map_err(IngestError::Insert)
    }
}

fn page_count(path: &Path) -> Result<u32> {
    let doc = lopdf::Document::load(path).map_err(|err| IngestError::Rejected(format!("{}: {err}", path.display())))?;
    Ok(doc.get_pages().len() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docingest_core::Result as CoreResult;
    use docingest_pdf::{ConvertedElement, DocumentTree, Label};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedConverter;

    impl Converter for FixedConverter {
        async fn convert(&self, _pdf_path: &Path) -> docingest_pdf::Result<DocumentTree> {
            Ok(DocumentTree {
                elements: vec![ConvertedElement {
                    label: Label::Text,
                    text: "hello world".to_string(),
                    prov: vec![1],
                    font_size: None,
                    parent_ref: None,
                }],
                tables: Vec::new(),
            })
        }
    }

    struct NoopLlm;

    impl LlmClient for NoopLlm {
        async fn summarize(&self, html: &[String], _model: &str, _tag: &str) -> CoreResult<Vec<String>> {
            Ok(html.iter().map(|h| format!("summary: {h}")).collect())
        }

        async fn classify(&self, summaries: &[String], _model: &str, _tag: &str) -> CoreResult<Vec<bool>> {
            Ok(vec![true; summaries.len()])
        }
    }

    struct WordCountTokenizer;

    impl Tokenizer for WordCountTokenizer {
        async fn count(&self, text: &str) -> CoreResult<usize> {
            Ok(text.split_whitespace().count())
        }
    }

    struct ZeroEmbedder;

    impl EmbeddingModel for ZeroEmbedder {
        fn dim(&self) -> usize {
            4
        }

        async fn embed(&self, _text: &str) -> CoreResult<Vec<f32>> {
            Ok(vec![0.0; 4])
        }
    }

    #[derive(Default)]
    struct CountingStore {
        count: AtomicUsize,
    }

    impl VectorStore for CountingStore {
        async fn insert(&self, documents: Vec<CombinedDocument>, _embedder: &dyn EmbeddingModel, _max_tokens: usize) -> anyhow::Result<()> {
            self.count.fetch_add(documents.len(), Ordering::SeqCst);
            Ok(())
        }

        fn index_name(&self) -> &str {
            "counting"
        }

        async fn reset(&self) -> anyhow::Result<()> {
            self.count.store(0, Ordering::SeqCst);
            Ok(())
        }
    }

    fn sample_pdf_bytes() -> Vec<u8> {
        // Minimal single-page PDF, enough for `lopdf::Document::load`.
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        let pages = lopdf::dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, lopdf::Object::Dictionary(pages));
        let catalog_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn page_count_reads_single_page_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, sample_pdf_bytes()).unwrap();
        assert_eq!(page_count(&path).unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn run_end_to_end_inserts_into_vector_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, sample_pdf_bytes()).unwrap();

        let store = Arc::new(CountingStore::default());
        let config = PipelineConfig::builder().cache_root(dir.path().join("cache")).build();
        let pipeline = Pipeline::new(
            config,
            Arc::new(FixedConverter),
            Arc::new(NoopLlm),
            Arc::new(WordCountTokenizer),
            store.clone(),
            Arc::new(ZeroEmbedder),
            "gpt",
            "tables",
        );

        let report = pipeline.run(vec![path]).await.unwrap();
        assert_eq!(report.documents.len(), 1);
        assert!(report.skipped.is_empty());
        assert_eq!(report.documents[0].chunk_count, 1);
        assert_eq!(store.count.load(Ordering::SeqCst), 1);
    }
}
