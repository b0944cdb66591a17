//! Error types for the CLI application.

use evidentia_domain::{DomainError, ResolveError};
use evidentia_extractor::ImportError;
use evidentia_gatekeeper::DoiFailure;
use evidentia_janitor::JanitorError;
use evidentia_store::StoreError;
use evidentia_synthesizer::SynthesisError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The command needs an existing store
    #[error("No study store at {0}. Run 'evidentia init' first.")]
    StoreMissing(PathBuf),

    /// Import error
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    /// Lifecycle transition rejected
    #[error("{0}")]
    Janitor(#[from] JanitorError),

    /// Summary export error
    #[error("{0}")]
    Synthesis(#[from] SynthesisError),

    /// Registry rejected a write
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// DOI resolver could not be set up
    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolveError),

    /// The creation gate rejected a study
    #[error("DOI rejected: {0}. Study not added.")]
    Validation(DoiFailure),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested study or claim does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Line editor failure
    #[error("Prompt error: {0}")]
    Prompt(String),
}
