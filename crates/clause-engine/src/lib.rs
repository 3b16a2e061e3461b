pub mod error;
pub mod highlight;
pub mod matcher;
pub mod matrix;
pub mod merge;
pub mod pattern;

pub use error::EngineError;
pub use highlight::split_highlights;
pub use matcher::find_clauses;
pub use matrix::build_matrix;
pub use merge::{admissible_identifier, merge_tables, normalize_header};
pub use pattern::clause_pattern;

use shared_types::{CanonicalTable, ComplianceMatrix, MatchSet, RawTable};

/// Cross-reference engine entry point
///
/// Owns the canonical reference table for the run and the distinct
/// identifier list derived from it. Read-only after construction, so one
/// instance serves every document in sequence.
pub struct CrossReferencer {
    table: CanonicalTable,
    identifiers: Vec<String>,
}

impl CrossReferencer {
    pub fn new(table: CanonicalTable) -> Self {
        let identifiers = table.distinct_identifiers();
        Self { table, identifiers }
    }

    /// Merge raw reference sources and build the engine in one step.
    pub fn from_sources(tables: Vec<RawTable>) -> Result<Self, EngineError> {
        Ok(Self::new(merge_tables(tables)?))
    }

    pub fn table(&self) -> &CanonicalTable {
        &self.table
    }

    pub fn known_identifiers(&self) -> &[String] {
        &self.identifiers
    }

    /// Which known clauses appear in this document's extracted text.
    pub fn match_text(&self, text: &str) -> Result<MatchSet, EngineError> {
        find_clauses(text, &self.identifiers)
    }

    /// Full reference rows for every matched clause, sorted by identifier.
    pub fn matrix_for(&self, found: &MatchSet) -> ComplianceMatrix {
        build_matrix(found, &self.table)
    }
}
