//! Shared DOCX handling utilities
//!
//! DOCX files are ZIP archives; the content lives in `word/document.xml`.
//! This crate extracts plain text for the matcher and rewrites matched
//! paragraphs with highlight runs, leaving every other archive entry and
//! every untouched paragraph byte-for-byte intact.

pub mod error;
pub mod extract;
pub mod highlight;

pub use error::DocxError;
pub use extract::extract_text;
pub use highlight::highlight_docx;

/// Path of the main content part inside the DOCX archive.
pub(crate) const DOCUMENT_PART: &str = "word/document.xml";
