use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a valid DOCX archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed document XML: {0}")]
    Xml(String),

    #[error("archive has no word/document.xml part")]
    MissingDocumentPart,

    #[error(transparent)]
    Pattern(#[from] clause_engine::EngineError),
}

impl From<quick_xml::Error> for DocxError {
    fn from(e: quick_xml::Error) -> Self {
        DocxError::Xml(e.to_string())
    }
}
