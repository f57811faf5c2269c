//! Turns a document's structured element stream into token-bounded chunks.

use docingest_core::Tokenizer;
use docingest_pdf::{Label, StructuredElement};

use crate::token_splitter;
use crate::types::Chunk;

#[derive(Default)]
struct Accumulator {
    chapter_title: Option<String>,
    section_title: Option<String>,
    subsection_title: Option<String>,
    subsubsection_title: Option<String>,
    content: String,
    page_range: Vec<u32>,
    source_nodes: Vec<String>,
}

impl Accumulator {
    fn titles_unset(&self) -> bool {
        self.chapter_title.is_none()
            && self.section_title.is_none()
            && self.subsection_title.is_none()
            && self.subsubsection_title.is_none()
    }

    fn seed_from(&mut self, running: &RunningTitles) {
        self.chapter_title = running.chapter_title.clone();
        self.section_title = running.section_title.clone();
        self.subsection_title = running.subsection_title.clone();
        self.subsubsection_title = running.subsubsection_title.clone();
    }

    fn reset(&mut self) {
        self.content.clear();
        self.page_range.clear();
        self.source_nodes.clear();
        self.chapter_title = None;
        self.section_title = None;
        self.subsection_title = None;
        self.subsubsection_title = None;
    }
}

#[derive(Default)]
struct RunningTitles {
    chapter_title: Option<String>,
    section_title: Option<String>,
    subsection_title: Option<String>,
    subsubsection_title: Option<String>,
}

impl RunningTitles {
    fn update(&mut self, level: u32, title: String) {
        self.clear_from(level);
        let slot = match level {
            1 => &mut self.chapter_title,
            2 => &mut self.section_title,
            3 => &mut self.subsection_title,
            _ => &mut self.subsubsection_title,
        };
        *slot = Some(title);
    }

    fn clear_from(&mut self, level: u32) {
        if level <= 1 {
            self.chapter_title = None;
        }
        if level <= 2 {
            self.section_title = None;
        }
        if level <= 3 {
            self.subsection_title = None;
        }
        if level <= 4 {
            self.subsubsection_title = None;
        }
    }
}

/// Parses a section header's resolved level from a leading `#`-run, falling
/// back to ranking its retained `font_size` against `sorted_sizes`.
fn header_level(element: &StructuredElement, sorted_sizes: &[f32]) -> (u32, String) {
    let trimmed = element.text.trim();
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if hashes > 0 {
        return (hashes as u32, trimmed[hashes..].trim().to_string());
    }

    let level = match element.font_size {
        Some(size) => sorted_sizes
            .iter()
            .position(|&candidate| (candidate - size).abs() < f32::EPSILON)
            .map_or(sorted_sizes.len().max(1) as u32, |rank| rank as u32 + 1),
        None => sorted_sizes.len().max(1) as u32,
    };
    (level, trimmed.to_string())
}

fn descending_unique_sizes(elements: &[StructuredElement]) -> Vec<f32> {
    let mut sizes: Vec<f32> = elements
        .iter()
        .filter(|e| e.label == Label::SectionHeader)
        .filter_map(|e| e.font_size)
        .collect();
    sizes.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    sizes.dedup_by(|a, b| (*a - *b).abs() < f32::EPSILON);
    sizes
}

/// Consumes a document's structured element list and emits token-bounded
/// chunks that carry the running header context.
///
/// `max_tokens` and `overlap` are forwarded to the `TokenSplitter`; see
/// [`token_splitter::split`].
pub async fn chunk_document(
    elements: &[StructuredElement],
    tokenizer: &dyn Tokenizer,
    max_tokens: usize,
    overlap: usize,
) -> anyhow::Result<Vec<Chunk>> {
    let sorted_sizes = descending_unique_sizes(elements);
    let mut running = RunningTitles::default();
    let mut acc = Accumulator::default();
    let mut sections: Vec<Chunk> = Vec::new();

    for (idx, element) in elements.iter().enumerate() {
        match element.label {
            Label::SectionHeader => {
                let (level, title) = header_level(element, &sorted_sizes);
                running.update(level, title);
                flush_and_split(&mut acc, tokenizer, max_tokens, overlap, &mut sections).await?;
            }
            Label::Text | Label::ListItem | Label::Code | Label::Formula => {
                if acc.titles_unset() {
                    acc.seed_from(&running);
                }

                match element.label {
                    Label::Code => acc.content.push_str(&format!("```{}``` ", element.text)),
                    Label::Formula => acc.content.push_str(&format!("${}$ ", element.text)),
                    _ => {
                        acc.content.push_str(&element.text);
                        acc.content.push(' ');
                    }
                }

                if let Some(page_no) = element.page_no {
                    acc.page_range.push(page_no);
                }
                acc.source_nodes.push(format!("#texts/{idx}"));
            }
            _ => {}
        }
    }

    flush_and_split(&mut acc, tokenizer, max_tokens, overlap, &mut sections).await?;

    Ok(sections)
}

async fn flush_and_split(
    acc: &mut Accumulator,
    tokenizer: &dyn Tokenizer,
    max_tokens: usize,
    overlap: usize,
    chunks: &mut Vec<Chunk>,
) -> anyhow::Result<()> {
    let trimmed = acc.content.trim();
    if trimmed.is_empty() {
        acc.reset();
        return Ok(());
    }

    let parts = token_splitter::split(trimmed, tokenizer, max_tokens, overlap).await?;
    let multi_part = parts.len() > 1;

    let mut page_range = acc.page_range.clone();
    page_range.sort_unstable();
    page_range.dedup();

    for (part_idx, part) in parts.into_iter().enumerate() {
        chunks.push(Chunk {
            chapter_title: acc.chapter_title.clone(),
            section_title: acc.section_title.clone(),
            subsection_title: acc.subsection_title.clone(),
            subsubsection_title: acc.subsubsection_title.clone(),
            content: part,
            page_range: page_range.clone(),
            source_nodes: acc.source_nodes.clone(),
            part_id: multi_part.then_some(part_idx as u32 + 1),
        });
    }

    acc.reset();
    Ok(())
}
