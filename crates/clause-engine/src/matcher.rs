//! Clause matching against extracted document text

use shared_types::MatchSet;

use crate::error::EngineError;
use crate::pattern::clause_pattern;

/// Find which known identifiers appear in the text as standalone tokens.
///
/// Matching is case-sensitive and whitespace-literal; each identifier is
/// tested with the shared word-boundary pattern so a short identifier never
/// fires inside a longer one. O(identifiers x text length), which is fine
/// for low-thousands of identifiers and bounded documents.
pub fn find_clauses<S: AsRef<str>>(text: &str, identifiers: &[S]) -> Result<MatchSet, EngineError> {
    let mut found = MatchSet::new();
    for identifier in identifiers {
        let identifier = identifier.as_ref();
        if identifier.is_empty() {
            continue;
        }
        if clause_pattern(&[identifier])?.is_match(text) {
            found.insert(identifier.to_string());
        }
    }
    Ok(found)
}
