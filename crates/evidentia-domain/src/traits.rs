//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Implementations live in `evidentia-store` and `evidentia-resolver`.

use crate::{ResolveError, Snapshot};

/// Uniform load/save contract over a persisted registry
///
/// Each command performs one `load`, any number of in-memory mutations on the
/// returned [`Snapshot`], and at most one `save`. There is no locking: the
/// last writer wins.
pub trait Repository {
    /// Error type for store operations
    type Error;

    /// Read the whole registry
    ///
    /// A store that does not exist yet yields an empty snapshot.
    fn load(&self) -> Result<Snapshot, Self::Error>;

    /// Replace the persisted registry with `snapshot`
    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error>;

    /// Whether anything has been persisted yet
    fn exists(&self) -> bool;
}

/// Bibliographic metadata returned by a DOI resolver
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedCitation {
    /// Publication title
    pub title: Option<String>,
    /// Author family names, in order
    pub authors: Vec<String>,
    /// Container title (journal)
    pub journal: Option<String>,
    /// Issued year
    pub year: Option<i32>,
}

/// Looks up a DOI against a resolution service
pub trait DoiResolver {
    /// Resolve a bare DOI (no `https://doi.org/` prefix)
    fn resolve(&self, doi: &str) -> Result<ResolvedCitation, ResolveError>;
}

impl<R: DoiResolver + ?Sized> DoiResolver for &R {
    fn resolve(&self, doi: &str) -> Result<ResolvedCitation, ResolveError> {
        (**self).resolve(doi)
    }
}

impl<R: DoiResolver + ?Sized> DoiResolver for Box<R> {
    fn resolve(&self, doi: &str) -> Result<ResolvedCitation, ResolveError> {
        (**self).resolve(doi)
    }
}
