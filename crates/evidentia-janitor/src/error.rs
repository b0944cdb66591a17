//! Error types for Janitor operations

use thiserror::Error;

/// Errors that can occur during Janitor operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JanitorError {
    /// Referenced study does not exist
    #[error("Study not found: {0}")]
    NotFound(String),

    /// Lifecycle transition not allowed from the current state
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
