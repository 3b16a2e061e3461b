//! Reference database directory loading

use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use shared_types::RawTable;
use tracing::{debug, warn};

use crate::error::SpreadsheetError;

/// Legacy output matrix that lives alongside the reference sources and must
/// never be re-ingested as one.
const LEGACY_MATRIX_FILENAME: &str = "Contract Ts&Cs Matrix.xlsm";

/// Files excluded from reference loading by naming convention: editor lock
/// files, hidden files, the definitions sheet, and the legacy matrix.
pub fn excluded_source(name: &str) -> bool {
    name.starts_with('~')
        || name.starts_with('.')
        || name.contains("Definitions")
        || name == LEGACY_MATRIX_FILENAME
}

/// Load every usable tabular file in the database directory.
///
/// Files that fail to parse are skipped with a warning (source-unusable,
/// non-fatal); deciding whether zero loaded sources is fatal belongs to the
/// merger. Entries are visited in file-name order so runs are reproducible.
pub fn load_reference_dir(dir: &Path) -> Result<Vec<RawTable>, SpreadsheetError> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    paths.sort();

    let mut tables = Vec::new();
    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
            continue;
        };
        if excluded_source(&name) {
            debug!(source = %name, "excluded by naming convention");
            continue;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let loaded = match ext.as_str() {
            "xlsx" | "xlsm" | "xls" => read_workbook(&path, &name),
            "csv" => read_csv(&path, &name),
            _ => continue,
        };
        match loaded {
            Ok(table) => tables.push(table),
            Err(e) => warn!(source = %name, error = %e, "skipped unreadable reference file"),
        }
    }
    Ok(tables)
}

/// Read the first worksheet of an Excel file into a raw table.
fn read_workbook(path: &Path, source: &str) -> Result<RawTable, SpreadsheetError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| SpreadsheetError::Parse {
        source_file: source.to_string(),
        message: e.to_string(),
    })?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SpreadsheetError::Parse {
            source_file: source.to_string(),
            message: "workbook has no sheets".to_string(),
        })?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| SpreadsheetError::Parse {
            source_file: source.to_string(),
            message: e.to_string(),
        })?;

    let mut rows = range.rows();
    let columns: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(cell_to_string).collect())
        .unwrap_or_default();
    let data: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(RawTable {
        source: source.to_string(),
        columns,
        rows: data,
    })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Whole floats are clause-adjacent numbers; render without ".0"
        Data::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR:{e:?}"),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Read a CSV file into a raw table. UTF-8 first; files that are not valid
/// UTF-8 are reinterpreted as latin-1. Malformed records are skipped.
fn read_csv(path: &Path, source: &str) -> Result<RawTable, SpreadsheetError> {
    let bytes = fs::read(path)?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| SpreadsheetError::Parse {
            source_file: source.to_string(),
            message: e.to_string(),
        })?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => rows.push(record.iter().map(str::to_string).collect()),
            Err(e) => warn!(source = %source, error = %e, "skipped malformed CSV record"),
        }
    }

    Ok(RawTable {
        source: source.to_string(),
        columns,
        rows,
    })
}
