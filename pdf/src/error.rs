use thiserror::Error;

/// Errors emitted while resolving outlines, headers, or extracting document content.
#[derive(Debug, Error)]
pub enum PdfError {
    /// The input bytes do not decode as a valid PDF structure.
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    /// The source PDF could not be read from the filesystem.
    #[error("failed to read PDF: {0}")]
    Io(#[from] std::io::Error),
    /// A table or text extraction step failed; the document is dropped for this run.
    #[error("structure extraction failed: {0}")]
    Structure(String),
    /// A collaborator (LLM client, tokenizer) returned an error.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, PdfError>;
