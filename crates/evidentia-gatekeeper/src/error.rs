//! Gatekeeper error types

use evidentia_domain::ResolveError;
use thiserror::Error;

/// Why a DOI failed validation
///
/// Failures are reported, never raised: the batch audit records them and
/// the creation gate turns them into a rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DoiFailure {
    /// Nothing to validate
    #[error("No DOI provided")]
    Missing,

    /// Resolver does not know the DOI
    #[error("DOI not found (404): {0}")]
    NotFound(String),

    /// Resolver answered with another non-success status
    #[error("HTTP {status} resolving DOI: {doi}")]
    Http {
        /// DOI being resolved
        doi: String,
        /// HTTP status code
        status: u16,
    },

    /// Resolver unreachable or timed out
    #[error("Network error resolving DOI: {0}")]
    Network(String),

    /// Resolver answered with something that is not a citation
    #[error("Error resolving DOI: {0}")]
    Malformed(String),
}

impl DoiFailure {
    /// Classify a resolver error for `doi`
    pub fn from_resolve(doi: &str, error: ResolveError) -> Self {
        match error {
            ResolveError::NotFound => DoiFailure::NotFound(doi.to_string()),
            ResolveError::Http(status) => DoiFailure::Http {
                doi: doi.to_string(),
                status,
            },
            ResolveError::Network(msg) => DoiFailure::Network(msg),
            ResolveError::Malformed(msg) => DoiFailure::Malformed(msg),
        }
    }

    /// Whether the failure is a transport problem rather than a bad DOI
    pub fn is_network(&self) -> bool {
        matches!(self, DoiFailure::Network(_))
    }
}
