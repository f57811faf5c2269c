//! Error types for the ingestion pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while running the ingestion pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The `Converter` collaborator failed to turn a PDF into a
    /// `DocumentTree`. The document is dropped for this run; no sidecars are
    /// written, so it is retried in full on the next run.
    #[error("conversion failed for {path}: {source}")]
    Conversion {
        /// The PDF being converted.
        path: PathBuf,
        /// Underlying error from `docingest-pdf`.
        #[source]
        source: docingest_pdf::PdfError,
    },

    /// PDF structure extraction failed (outline resolution, header
    /// classification, document/table processing).
    #[error("document processing failed for {path}: {source}")]
    Structure {
        /// The PDF being processed.
        path: PathBuf,
        /// Underlying error from `docingest-pdf`.
        #[source]
        source: docingest_pdf::PdfError,
    },

    /// Chunking (token splitting, header-context tracking) failed.
    #[error("chunking failed for {path}: {reason}")]
    Chunk {
        /// The PDF being chunked.
        path: PathBuf,
        /// Human-readable reason.
        reason: String,
    },

    /// A `VectorStore` insert failed.
    #[error("vector store insert failed: {0}")]
    Insert(#[source] anyhow::Error),

    /// A document was rejected entirely and dropped from the run (failed
    /// stage, logged, surviving stages continue for other documents).
    #[error("document rejected: {0}")]
    Rejected(String),

    /// Filesystem or cache I/O failed.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path the error occurred at.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Sidecar JSON could not be serialized or deserialized.
    #[error("serialization error at {path}: {source}")]
    Serde {
        /// Path the error occurred at.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
