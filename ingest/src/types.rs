//! Chunk and combined-document types handed to the vector store.

use serde::{Deserialize, Serialize};

/// The ingestion atom: a token-bounded span of text with its running
/// header context and source provenance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chunk {
    /// Running chapter-level title (level 1), if any section header preceded this chunk.
    pub chapter_title: Option<String>,
    /// Running section-level title (level 2).
    pub section_title: Option<String>,
    /// Running subsection-level title (level 3).
    pub subsection_title: Option<String>,
    /// Running subsubsection-level title (level 4).
    pub subsubsection_title: Option<String>,
    /// The chunk's text content.
    pub content: String,
    /// Sorted, deduplicated 1-based page numbers this chunk's source elements came from.
    pub page_range: Vec<u32>,
    /// Synthetic source references (`#texts/<idx>`) for every element that contributed.
    pub source_nodes: Vec<String>,
    /// 1-based position within the enclosing section's token-split parts, present
    /// only when that section produced more than one part.
    pub part_id: Option<u32>,
}

/// The flat record handed to `VectorStore::insert`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedDocument {
    /// The text to embed.
    pub page_content: String,
    /// Originating PDF's filename.
    pub filename: String,
    /// Whether this document came from a text chunk or a retained table.
    pub kind: DocumentKind,
    /// The title prefix for text documents, or the raw table HTML for table documents.
    pub source: String,
    /// Document language, fixed to English.
    pub language: String,
}

impl CombinedDocument {
    /// Builds a `CombinedDocument` for a text chunk, with `language` fixed to `"en"`.
    #[must_use]
    pub fn text(page_content: String, filename: String, title_prefix: String) -> Self {
        Self {
            page_content,
            filename,
            kind: DocumentKind::Text,
            source: title_prefix,
            language: "en".to_string(),
        }
    }

    /// Builds a `CombinedDocument` for a retained table, with `language` fixed to `"en"`.
    #[must_use]
    pub fn table(page_content: String, filename: String, html: String) -> Self {
        Self {
            page_content,
            filename,
            kind: DocumentKind::Table,
            source: html,
            language: "en".to_string(),
        }
    }
}

/// Origin of a [`CombinedDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Derived from a text chunk.
    Text,
    /// Derived from a retained table's summary.
    Table,
}
