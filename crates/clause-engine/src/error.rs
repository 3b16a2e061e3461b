use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Zero usable reference sources. Fatal to the whole run.
    #[error("no usable reference sources: every database file was skipped or empty")]
    NoDatabase,

    #[error("failed to build clause pattern: {0}")]
    Pattern(#[from] regex::Error),
}
