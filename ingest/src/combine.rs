//! Flattens one document's chunks and retained tables into the records
//! handed to the vector store.

use std::collections::HashMap;

use docingest_pdf::TableRecord;

use crate::types::{CombinedDocument, Chunk};

/// Produces the flat document list for one PDF's chunks and retained tables.
///
/// Text documents get one entry per chunk, with `page_content` prefixed by
/// a `"Chapter: … Section: … "` title header when any title slot is set.
/// Table documents get one entry per retained table, with `page_content`
/// set to the table's summary and `source` set to its raw HTML.
#[must_use]
pub fn combine(
    chunks: &[Chunk],
    tables: &HashMap<usize, TableRecord>,
    filename: &str,
) -> Vec<CombinedDocument> {
    let mut documents = Vec::with_capacity(chunks.len() + tables.len());

    for chunk in chunks {
        let prefix = title_prefix(chunk);
        let page_content = if prefix.is_empty() {
            chunk.content.clone()
        } else {
            format!("{prefix}{}", chunk.content)
        };
        documents.push(CombinedDocument::text(
            page_content,
            filename.to_string(),
            prefix,
        ));
    }

    let mut table_indices: Vec<&usize> = tables.keys().collect();
    table_indices.sort_unstable();
    for index in table_indices {
        let table = &tables[index];
        documents.push(CombinedDocument::table(
            table.summary.clone(),
            filename.to_string(),
            table.html.clone(),
        ));
    }

    documents
}

fn title_prefix(chunk: &Chunk) -> String {
    let mut parts = Vec::new();
    if let Some(title) = &chunk.chapter_title {
        parts.push(format!("Chapter: {title} "));
    }
    if let Some(title) = &chunk.section_title {
        parts.push(format!("Section: {title} "));
    }
    if let Some(title) = &chunk.subsection_title {
        parts.push(format!("Subsection: {title} "));
    }
    if let Some(title) = &chunk.subsubsection_title {
        parts.push(format!("Subsubsection: {title} "));
    }
    parts.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_with_titles(chapter: Option<&str>, section: Option<&str>, content: &str) -> Chunk {
        Chunk {
            chapter_title: chapter.map(str::to_string),
            section_title: section.map(str::to_string),
            subsection_title: None,
            subsubsection_title: None,
            content: content.to_string(),
            page_range: vec![1],
            source_nodes: vec!["#texts/0".to_string()],
            part_id: None,
        }
    }

    #[test]
    fn text_document_gets_title_prefix_when_present() {
        let chunks = vec![chunk_with_titles(Some("Intro"), Some("Overview"), "Body.")];
        let docs = combine(&chunks, &HashMap::new(), "doc.pdf");

        assert_eq!(docs.len(), 1);
        assert!(docs[0].page_content.starts_with("Chapter: Intro Section: Overview "));
        assert!(docs[0].page_content.ends_with("Body."));
    }

    #[test]
    fn text_document_without_titles_has_bare_content() {
        let chunks = vec![chunk_with_titles(None, None, "Body.")];
        let docs = combine(&chunks, &HashMap::new(), "doc.pdf");

        assert_eq!(docs[0].page_content, "Body.");
        assert_eq!(docs[0].source, "");
    }

    #[test]
    fn table_documents_use_summary_as_content_and_html_as_source() {
        let mut tables = HashMap::new();
        tables.insert(
            0,
            TableRecord {
                html: "<table></table>".to_string(),
                caption: "Table 1".to_string(),
                summary: "a two-column results table".to_string(),
            },
        );

        let docs = combine(&[], &tables, "doc.pdf");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].page_content, "a two-column results table");
        assert_eq!(docs[0].source, "<table></table>");
    }
}
