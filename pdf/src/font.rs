//! Dominant font size of glyph runs matching a piece of text on a page.

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use crate::header::fuzzy_partial_ratio;

struct FontRun {
    text: String,
    font_size: f32,
}

fn as_f32(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f),
        _ => None,
    }
}

/// Walks a page's content stream, pairing each shown text run with the font
/// size in effect when it was drawn (the size operand of the most recent
/// `Tf` operator).
fn extract_font_runs(doc: &Document, page_id: ObjectId) -> Vec<FontRun> {
    let Ok(content_bytes) = doc.get_page_content(page_id) else {
        return Vec::new();
    };
    let Ok(content) = Content::decode(&content_bytes) else {
        return Vec::new();
    };

    let mut runs = Vec::new();
    let mut current_size = 0.0f32;

    for op in content.operations {
        match op.operator.as_str() {
            "Tf" => {
                if let Some(size) = op.operands.get(1).and_then(as_f32) {
                    current_size = size;
                }
            }
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    push_run(&mut runs, bytes, current_size);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    let mut text = String::new();
                    for item in items {
                        if let Object::String(bytes, _) = item {
                            text.push_str(&String::from_utf8_lossy(bytes));
                        }
                    }
                    if !text.trim().is_empty() {
                        runs.push(FontRun {
                            text,
                            font_size: current_size,
                        });
                    }
                }
            }
            _ => {}
        }
    }

    runs
}

fn push_run(runs: &mut Vec<FontRun>, bytes: &[u8], font_size: f32) {
    let text = String::from_utf8_lossy(bytes).into_owned();
    if !text.trim().is_empty() {
        runs.push(FontRun { text, font_size });
    }
}

/// Probes the dominant font size of glyph runs matching `text` on a page.
pub struct FontSizeProbe;

impl FontSizeProbe {
    /// Returns the average font size of runs whose text matches `text`
    /// exactly (fuzzy partial-ratio score of 100), or `None` if the page is
    /// unknown or no run matches.
    #[must_use]
    pub fn probe(doc: &Document, page_id: Option<ObjectId>, text: &str) -> Option<f32> {
        let page_id = page_id?;
        let target = text.trim().to_lowercase();
        if target.is_empty() {
            return None;
        }

        let runs = extract_font_runs(doc, page_id);
        let matching: Vec<f32> = runs
            .iter()
            .filter(|run| {
                let candidate = run.text.trim().to_lowercase();
                !candidate.is_empty() && fuzzy_partial_ratio(&candidate, &target) >= 100.0
            })
            .map(|run| run.font_size)
            .collect();

        if matching.is_empty() {
            None
        } else {
            Some(matching.iter().sum::<f32>() / matching.len() as f32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_on_unknown_page_is_none() {
        let doc = Document::new();
        assert_eq!(FontSizeProbe::probe(&doc, None, "Title"), None);
    }

    #[test]
    fn probe_with_empty_text_is_none() {
        let doc = Document::new();
        assert_eq!(FontSizeProbe::probe(&doc, Some((1, 0)), "   "), None);
    }
}
