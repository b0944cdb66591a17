//! Domain error types

use thiserror::Error;

/// Errors raised by snapshot mutations and record validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A referenced study or claim does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind ("study", "claim")
        kind: &'static str,
        /// The missing identifier
        id: String,
    },

    /// Duplicate DOI or primary key
    #[error("Integrity conflict: {0}")]
    IntegrityConflict(String),

    /// A value violates a domain rule
    #[error("Invalid data: {0}")]
    Invalid(String),
}

impl DomainError {
    /// Shorthand for a missing study
    pub fn study_not_found(id: impl Into<String>) -> Self {
        DomainError::NotFound {
            kind: "study",
            id: id.into(),
        }
    }

    /// Shorthand for a missing claim
    pub fn claim_not_found(id: impl Into<String>) -> Self {
        DomainError::NotFound {
            kind: "claim",
            id: id.into(),
        }
    }
}

/// Why a DOI lookup did not produce a citation
///
/// Resolver failures are ordinary values; callers decide whether they are
/// fatal (the creation gate) or just recorded (the batch audit).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The resolver has no record of the DOI
    #[error("DOI not found")]
    NotFound,

    /// Any other non-success status
    #[error("HTTP {0}")]
    Http(u16),

    /// Transport failure: unreachable host, timeout, TLS
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not a usable citation
    #[error("Malformed response: {0}")]
    Malformed(String),
}
