//! Per-document orchestration: structured text extraction and table
//! summarization/retention.

use std::collections::HashMap;
use std::path::Path;

use docingest_core::LlmClient;
use lopdf::Document;

use crate::error::{PdfError, Result};
use crate::header::{HeaderResolver, DEFAULT_FUZZY_MATCH_THRESHOLD};
use crate::model::{ConvertedElement, DocumentTree, Label, StructuredElement, TableRecord};

/// Builds the structured element list and filtered table records for one
/// converted document.
pub struct DocumentProcessor<'doc> {
    header_resolver: HeaderResolver<'doc>,
}

impl<'doc> DocumentProcessor<'doc> {
    /// Builds a processor bound to the PDF's structure (for outline lookup
    /// and font-size probing).
    #[must_use]
    pub fn new(doc: &'doc Document) -> Self {
        Self {
            header_resolver: HeaderResolver::new(doc),
        }
    }

    /// Loads the PDF at `pdf_path` and builds a processor over it.
    pub fn open(pdf_path: &Path) -> Result<OwnedDocumentProcessor> {
        let doc = Document::load(pdf_path).map_err(|err| PdfError::Parse(err.to_string()))?;
        Ok(OwnedDocumentProcessor { doc })
    }

    /// Extracts the structured element stream, dropping labels outside the
    /// kept set and resolving section-header levels.
    ///
    /// `fuzzy_threshold` is the minimum `fuzzy_partial_ratio` score for an
    /// outline title to match a header's text (`PipelineConfig::fuzzy_threshold`).
    #[must_use]
    pub fn extract_text(&self, tree: &DocumentTree, fuzzy_threshold: f32) -> Vec<StructuredElement> {
        let sorted_sizes = descending_unique_sizes(tree);
        let mut out = Vec::new();
        let mut last_level = 0u32;

        for element in &tree.elements {
            if !element.label.is_kept_for_text() {
                continue;
            }

            if element.label == Label::SectionHeader {
                self.emit_header_occurrences(
                    element,
                    &sorted_sizes,
                    &mut last_level,
                    fuzzy_threshold,
                    &mut out,
                );
            } else {
                out.push(StructuredElement {
                    label: element.label,
                    text: element.text.clone(),
                    page_no: element.prov.first().copied(),
                    font_size: None,
                });
            }
        }

        out
    }

    fn emit_header_occurrences(
        &self,
        element: &ConvertedElement,
        sorted_sizes: &[f32],
        last_level: &mut u32,
        fuzzy_threshold: f32,
        out: &mut Vec<StructuredElement>,
    ) {
        for &page in &element.prov {
            let (level, display) = self.header_resolver.classify(
                &element.text,
                element.font_size,
                Some(page),
                sorted_sizes,
                *last_level,
                fuzzy_threshold,
            );
            *last_level = level;

            out.push(StructuredElement {
                label: Label::SectionHeader,
                text: format!("{} {display}", "#".repeat(level as usize)),
                page_no: Some(page),
                font_size: if self.header_resolver.has_outline() {
                    None
                } else {
                    element.font_size
                },
            });
        }
    }

    /// Matches captions to tables, summarizes and classifies each table via
    /// `llm`, and returns the retained subset keyed by table index.
    pub async fn extract_tables(
        &self,
        tree: &DocumentTree,
        llm: &dyn LlmClient,
        model: &str,
        tag: &str,
    ) -> Result<HashMap<usize, TableRecord>> {
        if tree.tables.is_empty() {
            return Ok(HashMap::new());
        }

        let mut captions: Vec<&ConvertedElement> = tree
            .elements
            .iter()
            .filter(|e| e.label == Label::Caption)
            .collect();

        let captions_by_table: Vec<String> = (0..tree.tables.len())
            .map(|ix| {
                let wanted = format!("#/tables/{ix}");
                captions
                    .iter()
                    .position(|c| c.parent_ref.as_deref() == Some(wanted.as_str()))
                    .map(|pos| captions.remove(pos).text.clone())
                    .unwrap_or_default()
            })
            .collect();

        let summaries = llm
            .summarize(&tree.tables, model, tag)
            .await
            .map_err(PdfError::Collaborator)?;
        let keep = llm
            .classify(&summaries, model, tag)
            .await
            .map_err(PdfError::Collaborator)?;

        let mut out = HashMap::new();
        for (ix, (html, (caption, (summary, retain)))) in tree
            .tables
            .iter()
            .zip(captions_by_table.into_iter().zip(summaries.into_iter().zip(keep)))
            .enumerate()
        {
            if retain {
                out.insert(
                    ix,
                    TableRecord {
                        html: html.clone(),
                        caption,
                        summary,
                    },
                );
            }
        }

        Ok(out)
    }
}

/// A [`DocumentProcessor`] together with the `lopdf::Document` it borrows
/// from, so callers don't have to manage the borrow themselves.
pub struct OwnedDocumentProcessor {
    doc: Document,
}

impl OwnedDocumentProcessor {
    /// Borrows a [`DocumentProcessor`] over the owned PDF document.
    #[must_use]
    pub fn processor(&self) -> DocumentProcessor<'_> {
        DocumentProcessor::new(&self.doc)
    }
}

fn descending_unique_sizes(tree: &DocumentTree) -> Vec<f32> {
    let mut sizes: Vec<f32> = tree
        .elements
        .iter()
        .filter(|e| e.label == Label::SectionHeader)
        .filter_map(|e| e.font_size)
        .collect();
    sizes.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    sizes.dedup_by(|a, b| (*a - *b).abs() < f32::EPSILON);
    sizes
}
