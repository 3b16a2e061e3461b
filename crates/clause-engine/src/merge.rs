//! Reference table merging
//!
//! Normalizes heterogeneous tabular clause sources (FAR, DFARS, agency
//! supplements) into one canonical table keyed by clause identifier.

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{CanonicalTable, ClauseRecord, RawTable, CLAUSE_COLUMN};
use tracing::{info, warn};

use crate::error::EngineError;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Identifiers at or past this length are narrative text, not clause numbers.
const MAX_IDENTIFIER_LEN: usize = 30;

/// Clean a raw column header so columns align across sources: embedded
/// newlines and asterisks removed, whitespace runs collapsed to one space.
pub fn normalize_header(raw: &str) -> String {
    let cleaned = raw.replace('\n', " ").replace('*', "");
    WHITESPACE_RUN.replace_all(cleaned.trim(), " ").into_owned()
}

/// Row admission filter: the clause field must contain at least one digit
/// and be shorter than 30 characters. Rejects instructional text, blank
/// separators, and narrative rows masquerading as data.
pub fn admissible_identifier(clause: &str) -> bool {
    let trimmed = clause.trim();
    trimmed.chars().any(|c| c.is_ascii_digit()) && trimmed.chars().count() < MAX_IDENTIFIER_LEN
}

/// Merge all usable sources into one canonical table.
///
/// A source is usable only if it carries a `Clause` column after header
/// normalization; unusable sources are skipped with a warning. The merged
/// column schema is the first-seen-ordered union of all usable sources'
/// normalized headers; rows from a source lacking a column carry an empty
/// value for it. Zero usable sources is fatal.
pub fn merge_tables(tables: Vec<RawTable>) -> Result<CanonicalTable, EngineError> {
    struct UsableSource {
        columns: Vec<String>,
        clause_idx: usize,
        rows: Vec<Vec<String>>,
    }

    let mut columns: Vec<String> = Vec::new();
    let mut usable: Vec<UsableSource> = Vec::new();

    for table in tables {
        let normalized: Vec<String> = table.columns.iter().map(|c| normalize_header(c)).collect();
        let Some(clause_idx) = normalized.iter().position(|c| c == CLAUSE_COLUMN) else {
            warn!(
                source = %table.source,
                "skipped: missing '{}' column", CLAUSE_COLUMN
            );
            continue;
        };

        let mut admitted = Vec::new();
        for mut row in table.rows {
            let clause = row.get(clause_idx).map(String::as_str).unwrap_or("");
            if !admissible_identifier(clause) {
                continue;
            }
            let trimmed = clause.trim().to_string();
            row[clause_idx] = trimmed;
            admitted.push(row);
        }

        for col in &normalized {
            if !columns.contains(col) {
                columns.push(col.clone());
            }
        }
        usable.push(UsableSource {
            columns: normalized,
            clause_idx,
            rows: admitted,
        });
    }

    if usable.is_empty() {
        return Err(EngineError::NoDatabase);
    }

    let mut records = Vec::new();
    for source in &usable {
        // Map each canonical column to this source's column, if present
        let index_map: Vec<Option<usize>> = columns
            .iter()
            .map(|col| source.columns.iter().position(|c| c == col))
            .collect();

        for row in &source.rows {
            let values: Vec<String> = index_map
                .iter()
                .map(|idx| {
                    idx.and_then(|i| row.get(i).cloned())
                        .unwrap_or_default()
                })
                .collect();
            records.push(ClauseRecord {
                identifier: row[source.clause_idx].clone(),
                values,
            });
        }
    }

    info!(
        sources = usable.len(),
        clauses = records.len(),
        "built canonical reference table"
    );
    Ok(CanonicalTable { columns, records })
}
