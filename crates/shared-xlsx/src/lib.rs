//! Shared spreadsheet I/O
//!
//! Reference database loading (XLSX/XLSM/XLS via calamine, CSV with a
//! latin-1 fallback) and compliance matrix writing with rubric cell colors.

pub mod error;
pub mod read;
pub mod write;

pub use error::SpreadsheetError;
pub use read::{excluded_source, load_reference_dir};
pub use write::write_matrix;
