use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    #[error("failed to extract text: {0}")]
    Extract(String),

    #[error("PDF operation failed: {0}")]
    Operation(String),

    #[error(transparent)]
    Pattern(#[from] clause_engine::EngineError),
}
