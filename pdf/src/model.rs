//! Data model shared by outline resolution, header classification, and
//! document/table extraction.

use serde::{Deserialize, Serialize};

/// Tag of an element emitted by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// A section heading, at any depth.
    SectionHeader,
    /// Body text.
    Text,
    /// A bulleted or numbered list item.
    ListItem,
    /// A source-code block.
    Code,
    /// A mathematical formula.
    Formula,
    /// A figure or table caption.
    Caption,
    /// A running page header, dropped before structuring.
    PageHeader,
    /// A running page footer, dropped before structuring.
    PageFooter,
    /// A cross-reference, dropped before structuring.
    Reference,
    /// A footnote, dropped before structuring.
    Footnote,
}

impl Label {
    /// Labels that `DocumentProcessor` keeps in the structured text stream.
    #[must_use]
    pub const fn is_kept_for_text(self) -> bool {
        !matches!(
            self,
            Self::PageHeader | Self::PageFooter | Self::Caption | Self::Reference | Self::Footnote
        )
    }

    /// Labels whose text contributes to a chunk's accumulated content.
    #[must_use]
    pub const fn is_body_content(self) -> bool {
        matches!(self, Self::Text | Self::ListItem | Self::Code | Self::Formula)
    }
}

/// One element of the converter's output tree, before structuring.
///
/// `prov` holds every page the element was observed on; it is usually a
/// single entry, but a section header split across a page boundary by the
/// converter can carry more than one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedElement {
    /// The element's tag.
    pub label: Label,
    /// Raw text content.
    pub text: String,
    /// 1-based page numbers this element was observed on, in order.
    pub prov: Vec<u32>,
    /// Dominant font size, when the converter reports one (section headers only).
    pub font_size: Option<f32>,
    /// Opaque handle associating a caption with its table, e.g. `#/tables/2`.
    pub parent_ref: Option<String>,
}

/// The converter's output for one document: structural elements plus raw table HTML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentTree {
    /// Elements in document order.
    pub elements: Vec<ConvertedElement>,
    /// Raw table HTML, in document order, indexed by position in this vector.
    pub tables: Vec<String>,
}

/// An outline (table of contents) entry, resolved to a page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    /// 1-based nesting depth; 1 is top-level.
    pub level: u32,
    /// Outline title text.
    pub title: String,
    /// Resolved 1-based page number, or `-1` if the destination could not be resolved.
    pub page_no: i64,
}

/// An element after header-level resolution, ready for chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredElement {
    /// The element's tag.
    pub label: Label,
    /// Text content; for section headers, prefixed with `#` characters encoding the level.
    pub text: String,
    /// Resolved 1-based page number, if any source provenance carried one.
    pub page_no: Option<u32>,
    /// Dominant font size; always `None` when the header level came from the outline.
    pub font_size: Option<f32>,
}

/// A retained table, paired with its caption and LLM-generated summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRecord {
    /// Raw table HTML.
    pub html: String,
    /// Caption text, empty if none was matched.
    pub caption: String,
    /// LLM-generated summary used as the embedded text for this table.
    pub summary: String,
}
