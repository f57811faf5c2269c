//! Resolves a section header's nesting level from an explicit `#`-prefix,
//! the document outline, or the page's font-size ranking.

use std::collections::HashMap;

use lopdf::{Document, ObjectId};
use tracing::debug;

use crate::font::FontSizeProbe;
use crate::model::OutlineEntry;
use crate::outline::OutlineRefResolver;

/// Default minimum `fuzzy_partial_ratio` score for an outline title to match
/// a header's extracted text, used by callers that don't carry their own
/// `PipelineConfig::fuzzy_threshold`.
pub const DEFAULT_FUZZY_MATCH_THRESHOLD: f32 = 80.0;

/// Classifies section headers against the document's outline or, failing
/// that, its font-size distribution.
pub struct HeaderResolver<'a> {
    doc: &'a Document,
    outline: Option<HashMap<i64, OutlineEntry>>,
    pages: HashMap<u32, ObjectId>,
}

impl<'a> HeaderResolver<'a> {
    /// Builds a resolver for `doc`. If the document carries an outline,
    /// every entry is resolved to a page number up front; otherwise the
    /// page list is retained for later font-size probing.
    #[must_use]
    pub fn new(doc: &'a Document) -> Self {
        let outline = build_outline_map(doc);
        let pages = doc.get_pages().into_iter().collect();
        Self {
            doc,
            outline,
            pages,
        }
    }

    /// Whether this document carries a usable outline.
    #[must_use]
    pub const fn has_outline(&self) -> bool {
        self.outline.is_some()
    }

    /// Classifies one section-header occurrence.
    ///
    /// `sorted_sizes` is the document's unique font sizes of section-header
    /// elements, sorted in descending order, used to rank a probed size when
    /// no outline is available. `last_level` is the level most recently
    /// assigned, used as the outline's no-match fallback.
    ///
    /// Returns the resolved level and the display text (the `#`-prefix
    /// stripped, if one was present).
    #[must_use]
    pub fn classify(
        &self,
        text: &str,
        font_size: Option<f32>,
        page_no: Option<u32>,
        sorted_sizes: &[f32],
        last_level: u32,
        fuzzy_threshold: f32,
    ) -> (u32, String) {
        let trimmed = text.trim();
        let hashes = trimmed.chars().take_while(|&c| c == '#').count();
        if hashes > 0 {
            let display = trimmed[hashes..].trim().to_string();
            debug!(level = hashes, text = %display, "header level assigned from hash prefix");
            return (hashes as u32, display);
        }

        if let Some(outline) = &self.outline {
            if let Some(entry) = page_no.and_then(|p| outline.get(&i64::from(p))) {
                let score = fuzzy_partial_ratio(
                    &trimmed.to_lowercase(),
                    &entry.title.to_lowercase(),
                );
                debug!(score, threshold = fuzzy_threshold, text = %trimmed, "fuzzy-match score against outline entry");
                if score >= fuzzy_threshold {
                    debug!(level = entry.level, "header level assigned from outline match");
                    return (entry.level, trimmed.to_string());
                }
            }
            let level = last_level + 1;
            debug!(level, "header level assigned from outline fallback (no match)");
            return (level, trimmed.to_string());
        }

        let page_id = page_no.and_then(|p| self.pages.get(&p).copied());
        let probed = FontSizeProbe::probe(self.doc, page_id, trimmed).or(font_size);
        let level = match probed {
            Some(size) => rank_of(size, sorted_sizes),
            None => sorted_sizes.len().max(1) as u32,
        };
        debug!(level, "header level assigned from font-size rank");
        (level, trimmed.to_string())
    }
}

fn rank_of(size: f32, sorted_sizes: &[f32]) -> u32 {
    sorted_sizes
        .iter()
        .position(|&candidate| (candidate - size).abs() < f32::EPSILON)
        .map_or(sorted_sizes.len().max(1) as u32, |rank| rank as u32 + 1)
}

fn build_outline_map(doc: &Document) -> Option<HashMap<i64, OutlineEntry>> {
    let catalog = doc.catalog().ok()?;
    let outlines_dict = match catalog.get(b"Outlines").ok()? {
        lopdf::Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok()?,
        lopdf::Object::Dictionary(d) => d,
        _ => return None,
    };
    let first = outlines_dict.get(b"First").ok()?;
    let lopdf::Object::Reference(first_id) = first else {
        return None;
    };

    let resolver = OutlineRefResolver::new(doc);
    let mut entries = Vec::new();
    walk_outline_node(doc, &resolver, *first_id, 1, &mut entries);

    if entries.is_empty() {
        return None;
    }

    let mut map = HashMap::new();
    for entry in entries {
        map.insert(entry.page_no, entry);
    }
    Some(map)
}

fn walk_outline_node(
    doc: &Document,
    resolver: &OutlineRefResolver<'_>,
    node_id: ObjectId,
    level: u32,
    out: &mut Vec<OutlineEntry>,
) {
    let Ok(dict) = doc.get_dictionary(node_id) else {
        return;
    };

    let title = dict
        .get(b"Title")
        .ok()
        .and_then(|t| match t {
            lopdf::Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .unwrap_or_default();

    let dest_obj = dict
        .get(b"Dest")
        .ok()
        .or_else(|| {
            dict.get(b"A")
                .ok()
                .and_then(|a| resolve_ref(doc, a))
                .and_then(|action| action.as_dict().ok())
                .and_then(|action_dict| action_dict.get(b"D").ok())
        })
        .or_else(|| dict.get(b"SE").ok());

    let page_no = dest_obj.and_then(|obj| resolver.resolve(obj)).map_or(-1, i64::from);

    if !title.is_empty() {
        out.push(OutlineEntry {
            level,
            title,
            page_no,
        });
    }

    if let Ok(lopdf::Object::Reference(first_id)) = dict.get(b"First") {
        walk_outline_node(doc, resolver, *first_id, level + 1, out);
    }
    if let Ok(lopdf::Object::Reference(next_id)) = dict.get(b"Next") {
        walk_outline_node(doc, resolver, *next_id, level, out);
    }
}

fn resolve_ref<'a>(doc: &'a Document, obj: &'a lopdf::Object) -> Option<&'a lopdf::Object> {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// RapidFuzz-style partial ratio: slides the shorter string over every
/// equal-length window of the longer one and returns the best Levenshtein
/// similarity, scaled 0-100.
#[must_use]
pub fn fuzzy_partial_ratio(a: &str, b: &str) -> f32 {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    let shorter: Vec<char> = shorter.chars().collect();
    let longer: Vec<char> = longer.chars().collect();

    if shorter.is_empty() {
        return if longer.is_empty() { 100.0 } else { 0.0 };
    }
    if longer.len() <= shorter.len() {
        return ratio(&shorter, &longer);
    }

    let mut best = 0.0f32;
    for start in 0..=(longer.len() - shorter.len()) {
        let window = &longer[start..start + shorter.len()];
        let score = ratio(&shorter, window);
        if score > best {
            best = score;
        }
        if best >= 100.0 {
            break;
        }
    }
    best
}

fn ratio(a: &[char], b: &[char]) -> f32 {
    let distance = levenshtein(a, b);
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 100.0;
    }
    (1.0 - distance as f32 / max_len as f32) * 100.0
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuzzy_exact_match_is_100() {
        assert!((fuzzy_partial_ratio("introduction", "introduction") - 100.0).abs() < 0.01);
    }

    #[test]
    fn fuzzy_partial_substring_scores_high() {
        let score = fuzzy_partial_ratio("introduction", "1. introduction to the system");
        assert!(score >= 80.0, "expected >= 80, got {score}");
    }

    #[test]
    fn fuzzy_unrelated_text_scores_low() {
        let score = fuzzy_partial_ratio("introduction", "appendix c: legal notices");
        assert!(score < 50.0, "expected < 50, got {score}");
    }

    #[test]
    fn classify_strips_explicit_hash_prefix() {
        let doc = Document::new();
        let resolver = HeaderResolver::new(&doc);
        let (level, text) =
            resolver.classify("## Background", None, None, &[], 0, DEFAULT_FUZZY_MATCH_THRESHOLD);
        assert_eq!(level, 2);
        assert_eq!(text, "Background");
    }

    #[test]
    fn classify_without_outline_ranks_by_font_size() {
        let doc = Document::new();
        let resolver = HeaderResolver::new(&doc);
        assert!(!resolver.has_outline());
        let sorted_sizes = [24.0, 18.0, 14.0];
        let (level, text) = resolver.classify(
            "Methods",
            Some(18.0),
            None,
            &sorted_sizes,
            0,
            DEFAULT_FUZZY_MATCH_THRESHOLD,
        );
        assert_eq!(level, 2);
        assert_eq!(text, "Methods");
    }

    #[test]
    fn classify_without_outline_and_unknown_size_uses_deepest_level() {
        let doc = Document::new();
        let resolver = HeaderResolver::new(&doc);
        let sorted_sizes = [24.0, 18.0];
        let (level, _) = resolver.classify(
            "Methods",
            None,
            None,
            &sorted_sizes,
            0,
            DEFAULT_FUZZY_MATCH_THRESHOLD,
        );
        assert_eq!(level, 2);
    }
}
