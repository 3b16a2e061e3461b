//! PDF text extraction

use std::path::Path;

use tracing::debug;

use crate::error::PdfError;

/// Extract the text layer of a PDF.
///
/// Scanned documents with no text layer come back (near-)empty; the driver
/// treats those as extraction-empty and skips the document. OCR is an
/// external collaborator and is not attempted here.
pub fn extract_text(path: &Path) -> Result<String, PdfError> {
    let text = pdf_extract::extract_text(path).map_err(|e| PdfError::Extract(e.to_string()))?;
    debug!(chars = text.len(), path = %path.display(), "extracted PDF text");
    Ok(text)
}
