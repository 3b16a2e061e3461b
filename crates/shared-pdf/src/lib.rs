//! Shared PDF handling utilities
//!
//! Text extraction for the matcher and highlight annotation of matched
//! clause occurrences. The cross-reference logic itself lives in
//! `clause-engine`; this crate only wraps the PDF libraries.

pub mod error;
pub mod extract;
pub mod highlight;

pub use error::PdfError;
pub use extract::extract_text;
pub use highlight::highlight_pdf;
