use std::collections::BTreeSet;

/// Column name every usable reference source must carry (post-normalization).
pub const CLAUSE_COLUMN: &str = "Clause";

/// One tabular reference source as loaded from disk, headers untouched.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RawTable {
    pub source: String, // file name, for skip/warn reporting
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One row of the canonical reference table.
///
/// `values` is aligned to the owning table's column schema; the clause
/// identifier is duplicated out of the row for cheap joining.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClauseRecord {
    pub identifier: String,
    pub values: Vec<String>,
}

/// The merged multi-source reference table. Built once per run, read-only
/// thereafter; safe to share across sequential document iterations.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CanonicalTable {
    pub columns: Vec<String>,
    pub records: Vec<ClauseRecord>,
}

impl CanonicalTable {
    /// Distinct clause identifiers in first-appearance order.
    pub fn distinct_identifiers(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for record in &self.records {
            if seen.insert(record.identifier.as_str()) {
                out.push(record.identifier.clone());
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Deduplicated set of clause identifiers found in a document's text.
/// Backed by a `BTreeSet` so iteration is already in ascending sort order.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MatchSet(BTreeSet<String>);

impl MatchSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn insert(&mut self, identifier: String) -> bool {
        self.0.insert(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.0.contains(identifier)
    }

    /// Identifiers in ascending lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for MatchSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for MatchSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_owned).collect())
    }
}

/// Per-document report: every recognized clause joined back to its full
/// reference metadata, one row per matching source record.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ComplianceMatrix {
    pub columns: Vec<String>,
    pub records: Vec<ClauseRecord>,
}

impl ComplianceMatrix {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SpanKind {
    Plain,
    Highlight,
}

/// A labeled substring of a paragraph. The ordered concatenation of a
/// paragraph's spans reconstructs its original text exactly.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HighlightSpan {
    pub kind: SpanKind,
    pub text: String,
}

impl HighlightSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: SpanKind::Plain,
            text: text.into(),
        }
    }

    pub fn highlight(text: impl Into<String>) -> Self {
        Self {
            kind: SpanKind::Highlight,
            text: text.into(),
        }
    }

    pub fn is_highlight(&self) -> bool {
        self.kind == SpanKind::Highlight
    }
}
