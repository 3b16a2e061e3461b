//! Paragraph highlight reconstruction
//!
//! A formatted paragraph cannot be partially restyled in place: the writer
//! discards the original text container and rebuilds it run by run. This
//! module decides the runs. Splitting uses the same pattern construction as
//! detection, so "is it present" and "where does it start/end" cannot drift.

use shared_types::{HighlightSpan, MatchSet};

use crate::error::EngineError;
use crate::pattern::clause_pattern;

/// Split one paragraph's text into plain/highlighted spans.
///
/// Returns `None` when no member of the match set occurs in this paragraph,
/// signaling the caller to leave the paragraph untouched rather than
/// re-author it. Otherwise the returned spans cover the entire text with no
/// gaps or overlaps; concatenating them reproduces the input exactly.
pub fn split_highlights(
    text: &str,
    found: &MatchSet,
) -> Result<Option<Vec<HighlightSpan>>, EngineError> {
    if found.is_empty() {
        return Ok(None);
    }

    // Restrict to the identifiers actually present in this paragraph,
    // using the same boundary test as document-level detection.
    let mut present: Vec<&str> = Vec::new();
    for identifier in found.iter() {
        if clause_pattern(&[identifier])?.is_match(text) {
            present.push(identifier);
        }
    }
    if present.is_empty() {
        return Ok(None);
    }

    let combined = clause_pattern(&present)?;
    let mut spans = Vec::new();
    let mut last = 0;
    for m in combined.find_iter(text) {
        if m.start() > last {
            spans.push(HighlightSpan::plain(&text[last..m.start()]));
        }
        // A piece is highlighted iff it is identically one of the present
        // identifiers; classification is decided from content alone.
        let piece = m.as_str();
        if present.iter().any(|id| *id == piece) {
            spans.push(HighlightSpan::highlight(piece));
        } else {
            spans.push(HighlightSpan::plain(piece));
        }
        last = m.end();
    }
    if last < text.len() {
        spans.push(HighlightSpan::plain(&text[last..]));
    }

    Ok(Some(spans))
}
