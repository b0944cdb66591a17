//! Evidentia Gatekeeper
//!
//! Verifies that a study's DOI resolves to a real, matching publication
//! before the registry trusts it.
//!
//! The Gatekeeper provides:
//! - DOI resolution with distinguished failure modes (not found, HTTP, network)
//! - Fuzzy title matching against the resolved metadata
//! - The creation gate used when a study is added interactively
//! - A rate-limited batch audit over every study with a DOI
//!
//! # Examples
//!
//! ```
//! use evidentia_gatekeeper::{DoiValidator, GateDecision, ValidationConfig};
//! use evidentia_resolver::MockResolver;
//!
//! let resolver = MockResolver::new();
//! resolver.add_title("10.1000/xyz", "Protein intake and mortality risk");
//!
//! let validator = DoiValidator::new(resolver, ValidationConfig::default());
//! let decision = validator.gate(Some("10.1000/xyz"), None);
//! assert!(matches!(decision, GateDecision::Accepted { .. }));
//! ```

#![warn(missing_docs)]

mod audit;
mod config;
mod error;
mod title;
mod validator;

pub use audit::{AuditOutcome, AuditReport};
pub use config::ValidationConfig;
pub use error::DoiFailure;
pub use title::{normalize_title, titles_match};
pub use validator::{DoiValidation, DoiValidator, GateDecision};
