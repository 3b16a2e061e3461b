//! Clause pattern construction
//!
//! Detection ("is this identifier present") and splitting ("where exactly
//! does it start/end") must never drift apart, so both the matcher and the
//! highlight splitter build their regexes through this one routine.

use regex::Regex;

use crate::error::EngineError;

/// Build a word-boundary pattern whose alternatives are exactly the given
/// identifiers, with every regex metacharacter treated literally.
///
/// The `\b` anchors keep a short identifier (e.g. one ending `52.2`) from
/// matching inside a longer token (`52.212-4`), while still matching when
/// the identifier is followed by punctuation (`52.219-6(a)`).
///
/// Callers must pass at least one identifier; an empty alternation would
/// match the empty string at every word boundary.
pub fn clause_pattern<S: AsRef<str>>(identifiers: &[S]) -> Result<Regex, EngineError> {
    debug_assert!(!identifiers.is_empty());
    let alternatives: Vec<String> = identifiers
        .iter()
        .map(|id| regex::escape(id.as_ref()))
        .collect();
    let pattern = format!(r"\b(?:{})\b", alternatives.join("|"));
    Ok(Regex::new(&pattern)?)
}
