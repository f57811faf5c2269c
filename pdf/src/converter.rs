//! The document-conversion collaborator.

use std::future::Future;
use std::path::Path;

use crate::model::DocumentTree;

/// Converts a PDF file into a structural element tree plus raw table HTML.
///
/// Implementations typically shell out to, or embed, a layout-aware
/// converter; this crate treats the conversion step as an external
/// collaborator so it can be swapped or mocked independently of header
/// resolution and chunking.
pub trait Converter: Send + Sync {
    /// Converts the PDF at `pdf_path`, returning its structural element tree.
    fn convert(
        &self,
        pdf_path: &Path,
    ) -> impl Future<Output = crate::error::Result<DocumentTree>> + Send;
}
