//! Shared data model for the clause cross-referencing workspace

pub mod types;

pub use types::{
    CanonicalTable, ClauseRecord, ComplianceMatrix, HighlightSpan, MatchSet, RawTable, SpanKind,
    CLAUSE_COLUMN,
};
