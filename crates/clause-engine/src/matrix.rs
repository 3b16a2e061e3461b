//! Compliance matrix assembly

use shared_types::{CanonicalTable, ComplianceMatrix, MatchSet};

/// Join matched identifiers back to the canonical table.
///
/// Identifiers are taken in ascending sort order (the `MatchSet` iterates
/// sorted); every record sharing an identifier is appended in the canonical
/// table's relative order. Duplicates across sources are intentional: each
/// governing source cites the clause with its own metadata. An empty match
/// set yields an empty matrix, which the driver treats as "nothing to
/// persist" rather than an error.
pub fn build_matrix(found: &MatchSet, table: &CanonicalTable) -> ComplianceMatrix {
    let mut records = Vec::new();
    for identifier in found.iter() {
        for record in table.records.iter().filter(|r| r.identifier == identifier) {
            records.push(record.clone());
        }
    }
    ComplianceMatrix {
        columns: table.columns.clone(),
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::ClauseRecord;

    fn record(id: &str, title: &str) -> ClauseRecord {
        ClauseRecord {
            identifier: id.to_string(),
            values: vec![id.to_string(), title.to_string()],
        }
    }

    fn table(records: Vec<ClauseRecord>) -> CanonicalTable {
        CanonicalTable {
            columns: vec!["Clause".to_string(), "Title".to_string()],
            records,
        }
    }

    #[test]
    fn test_rows_sorted_by_identifier() {
        let table = table(vec![record("52.219-6", "B"), record("52.212-4", "A")]);
        let found: MatchSet = ["52.219-6", "52.212-4"].into_iter().collect();
        let matrix = build_matrix(&found, &table);
        let ids: Vec<&str> = matrix
            .records
            .iter()
            .map(|r| r.identifier.as_str())
            .collect();
        assert_eq!(ids, vec!["52.212-4", "52.219-6"]);
    }

    #[test]
    fn test_duplicate_source_records_not_deduplicated() {
        let table = table(vec![
            record("52.212-4", "FAR wording"),
            record("52.219-6", "unrelated"),
            record("52.212-4", "Agency wording"),
        ]);
        let found: MatchSet = ["52.212-4"].into_iter().collect();
        let matrix = build_matrix(&found, &table);
        assert_eq!(matrix.records.len(), 2);
        // Canonical relative order among duplicates preserved
        assert_eq!(matrix.records[0].values[1], "FAR wording");
        assert_eq!(matrix.records[1].values[1], "Agency wording");
    }

    #[test]
    fn test_empty_match_set_yields_empty_matrix() {
        let table = table(vec![record("52.212-4", "A")]);
        let matrix = build_matrix(&MatchSet::new(), &table);
        assert!(matrix.is_empty());
        assert_eq!(matrix.columns, vec!["Clause", "Title"]);
    }
}
