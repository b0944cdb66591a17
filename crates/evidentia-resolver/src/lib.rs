//! Evidentia DOI Resolver Layer
//!
//! Implementations of the `DoiResolver` trait from `evidentia-domain`.
//!
//! # Resolvers
//!
//! - `MockResolver`: Deterministic, offline resolver for testing
//! - `DoiOrgResolver`: doi.org content negotiation over HTTP
//!
//! # Examples
//!
//! ```
//! use evidentia_domain::DoiResolver;
//! use evidentia_resolver::MockResolver;
//!
//! let resolver = MockResolver::new();
//! resolver.add_title("10.1000/xyz", "Protein intake and mortality risk");
//! let citation = resolver.resolve("10.1000/xyz").unwrap();
//! assert_eq!(citation.title.as_deref(), Some("Protein intake and mortality risk"));
//! ```

#![warn(missing_docs)]

pub mod doi_org;

use evidentia_domain::{DoiResolver, ResolveError, ResolvedCitation};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use doi_org::{
    DoiOrgResolver, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BACKOFF,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

type Responses = HashMap<String, Result<ResolvedCitation, ResolveError>>;

/// Mock resolver for deterministic testing
///
/// Answers from a pre-configured table without any network calls. Unknown
/// DOIs resolve to [`ResolveError::NotFound`]. Clones share the table and the
/// call counter.
#[derive(Debug, Clone, Default)]
pub struct MockResolver {
    responses: Arc<Mutex<Responses>>,
    call_count: Arc<Mutex<usize>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockResolver {
    /// Create an empty mock
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `doi` to a citation with just a title
    pub fn add_title(&self, doi: impl Into<String>, title: impl Into<String>) {
        self.add_citation(
            doi,
            ResolvedCitation {
                title: Some(title.into()),
                ..ResolvedCitation::default()
            },
        );
    }

    /// Resolve `doi` to a full citation
    pub fn add_citation(&self, doi: impl Into<String>, citation: ResolvedCitation) {
        lock(&self.responses).insert(doi.into(), Ok(citation));
    }

    /// Make `doi` fail with `error`
    pub fn add_error(&self, doi: impl Into<String>, error: ResolveError) {
        lock(&self.responses).insert(doi.into(), Err(error));
    }

    /// Number of `resolve` calls so far
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }
}

impl DoiResolver for MockResolver {
    fn resolve(&self, doi: &str) -> Result<ResolvedCitation, ResolveError> {
        *lock(&self.call_count) += 1;

        lock(&self.responses)
            .get(doi.trim())
            .cloned()
            .unwrap_or(Err(ResolveError::NotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_unknown_doi_not_found() {
        let resolver = MockResolver::new();
        assert_eq!(resolver.resolve("10.1/none"), Err(ResolveError::NotFound));
    }

    #[test]
    fn test_mock_specific_responses() {
        let resolver = MockResolver::new();
        resolver.add_title("10.1/a", "Title A");
        resolver.add_error("10.1/b", ResolveError::Http(503));

        assert_eq!(resolver.resolve("10.1/a").unwrap().title.as_deref(), Some("Title A"));
        assert_eq!(resolver.resolve("10.1/b"), Err(ResolveError::Http(503)));
    }

    #[test]
    fn test_mock_call_count_shared_by_clones() {
        let resolver = MockResolver::new();
        let clone = resolver.clone();

        assert_eq!(resolver.call_count(), 0);
        let _ = clone.resolve("10.1/x");
        let _ = resolver.resolve("10.1/y");
        assert_eq!(resolver.call_count(), 2);

        resolver.reset_call_count();
        assert_eq!(clone.call_count(), 0);
    }
}
