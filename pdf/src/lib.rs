//! Outline resolution, header-level classification, and per-document
//! structuring for the PDF ingestion pipeline.
//!
//! This crate owns everything that needs direct access to a PDF's object
//! graph: resolving outline destinations to page numbers
//! ([`outline::OutlineRefResolver`]), picking a section header's nesting
//! level from the outline or font-size ranking ([`header::HeaderResolver`]),
//! and turning a converter's raw element tree into the structured text and
//! table records the chunking stage consumes ([`processor::DocumentProcessor`]).

mod converter;
mod error;
mod font;
mod header;
mod model;
mod outline;
mod processor;

pub use converter::Converter;
pub use error::{PdfError, Result};
pub use header::{HeaderResolver, fuzzy_partial_ratio};
pub use model::{ConvertedElement, DocumentTree, Label, OutlineEntry, StructuredElement, TableRecord};
pub use outline::OutlineRefResolver;
pub use processor::{DocumentProcessor, OwnedDocumentProcessor};
