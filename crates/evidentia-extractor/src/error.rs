//! Error types for the Importer

use evidentia_domain::DomainError;
use thiserror::Error;

/// Errors that abort an import
///
/// Individual bad rows are not errors: they are collected as
/// [`RowFailure`](crate::RowFailure)s in the report.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Source document is structurally unusable
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Registry rejected a write
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ImportError {
    fn from(e: serde_json::Error) -> Self {
        ImportError::JsonParse(e.to_string())
    }
}
