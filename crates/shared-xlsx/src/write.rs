//! Compliance matrix spreadsheet output

use std::path::Path;

use rust_xlsxwriter::{Color, Format, Workbook};
use shared_types::ComplianceMatrix;
use tracing::debug;

use crate::error::SpreadsheetError;

// Rubric fills (green / yellow / red)
const FILL_OK: Color = Color::RGB(0xC6EFCE);
const FILL_C: Color = Color::RGB(0xFFEB9C);
const FILL_REMOVE: Color = Color::RGB(0xFFC7CE);

/// Write the matrix as an XLSX workbook: header row plus one row per
/// matched record, with rubric color-coding applied to every data cell
/// whose value is `ok` / `c` / `remove` (case-insensitive, trimmed).
pub fn write_matrix(path: &Path, matrix: &ComplianceMatrix) -> Result<(), SpreadsheetError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    let header = Format::new().set_bold();
    for (col, name) in matrix.columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &header)?;
    }

    let fill_ok = Format::new().set_background_color(FILL_OK);
    let fill_c = Format::new().set_background_color(FILL_C);
    let fill_remove = Format::new().set_background_color(FILL_REMOVE);

    for (i, record) in matrix.records.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, value) in record.values.iter().enumerate() {
            let col = col as u16;
            match rubric_fill(value) {
                Some(Rubric::Ok) => sheet.write_string_with_format(row, col, value, &fill_ok)?,
                Some(Rubric::C) => sheet.write_string_with_format(row, col, value, &fill_c)?,
                Some(Rubric::Remove) => {
                    sheet.write_string_with_format(row, col, value, &fill_remove)?
                }
                None => sheet.write_string(row, col, value)?,
            };
        }
    }

    workbook.save(path)?;
    debug!(rows = matrix.records.len(), path = %path.display(), "wrote compliance matrix");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rubric {
    Ok,
    C,
    Remove,
}

fn rubric_fill(value: &str) -> Option<Rubric> {
    match value.trim().to_lowercase().as_str() {
        "ok" => Some(Rubric::Ok),
        "c" => Some(Rubric::C),
        "remove" => Some(Rubric::Remove),
        _ => None,
    }
}
