use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {source_file}: {message}")]
    Parse {
        source_file: String,
        message: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}
