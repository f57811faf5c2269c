//! Chunking, caching, and pipeline orchestration for the document ingestion
//! pipeline.
//!
//! This crate turns a `docingest-pdf` structured element stream into
//! token-bounded chunks carrying their running header context, caches every
//! pipeline stage's output on disk keyed by PDF checksum, and orchestrates a
//! full run — classification, bounded-concurrency convert/process/chunk
//! batches, and a final aggregated [`VectorStore`] insert — via [`Pipeline`].
//!
//! # Architecture
//!
//! - [`config`] — [`PipelineConfig`], the run's tunable knobs.
//! - [`cache`] — [`CacheLayer`], the checksum-gated sidecar files.
//! - [`token_splitter`] — greedy sentence-packing against a token budget.
//! - [`chunking`] — [`chunk_document`], running header-context tracking.
//! - [`combine`] — [`combine`], flattening chunks and retained tables into
//!   [`CombinedDocument`] records.
//! - [`vector_store`] — [`VectorStore`], the retrieval-backend collaborator.
//! - [`pipeline`] — [`Pipeline`], the batch orchestrator.

pub mod cache;
pub mod chunking;
pub mod combine;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod token_splitter;
pub mod types;
pub mod vector_store;

pub use cache::CacheLayer;
pub use chunking::chunk_document;
pub use combine::combine;
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{IngestError, Result};
pub use pipeline::{DocumentStats, Pipeline, PipelineReport, StageTimings};
pub use types::{Chunk, CombinedDocument, DocumentKind};
pub use vector_store::VectorStore;
