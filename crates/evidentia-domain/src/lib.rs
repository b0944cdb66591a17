//! Evidentia Domain Layer
//!
//! Core data model of the evidence registry: studies, the exposure→outcome
//! claims they bear on, the links between them, and where studies are cited.
//! Every other crate operates on the [`Snapshot`] defined here and reaches
//! storage and the network only through the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **Study**: a scored publication; `final_score` is always derived
//! - **Claim**: an opaque `exposure→outcome` key under review
//! - **Link**: a study↔claim edge that may override the study's direction
//! - **Usage**: where a study is cited in generated content
//! - **Snapshot**: the whole registry, loaded and saved as one unit

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod category;
pub mod claim;
pub mod direction;
pub mod error;
pub mod link;
pub mod snapshot;
pub mod study;
pub mod traits;

// Re-exports for convenience
pub use category::{CategoryMap, OTHER_CATEGORY};
pub use claim::{Claim, ClaimId, ClaimRecord, CLAIM_SEPARATOR};
pub use direction::Direction;
pub use error::{DomainError, ResolveError};
pub use link::{EvidenceUsage, RemovedStudy, StudyClaimLink, UsageRole};
pub use snapshot::{LinkedStudy, Snapshot};
pub use study::{
    normalize_doi, EffectSize, Relevance, Score, Study, StudyId, StudyRecord, StudyStatus,
    StudyType,
};
pub use traits::{DoiResolver, Repository, ResolvedCitation};
