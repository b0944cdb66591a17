//! Evidentia Janitor
//!
//! Registry upkeep: staleness tracking, study lifecycle, and completeness.
//!
//! # Overview
//!
//! The Janitor is responsible for:
//! - **Stale study detection**: studies not re-verified within the window
//! - **Lifecycle transitions**: supersede, retract, re-verify
//! - **Enrichment audit**: studies missing required bibliographic fields
//!
//! ## Lifecycle
//!
//! | From | Operation | To | Audit record |
//! |------|-----------|----|--------------|
//! | active / superseded | `supersede(old, new)` | superseded, `superseded_by = new` | yes |
//! | active / superseded | `retract(id, reason)` | retracted | yes |
//! | any | `reverify(id)` | unchanged, `verified_date` refreshed | no |
//!
//! Studies are never deleted. Every operation takes today's date explicitly
//! so reports are reproducible.
//!
//! # Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use evidentia_domain::{Snapshot, StudyId};
//! use evidentia_janitor::{Janitor, JanitorError};
//!
//! let janitor = Janitor::default_config();
//! let mut snapshot = Snapshot::new();
//! let today = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
//!
//! let result = janitor.supersede(&mut snapshot, &StudyId::new("a"), &StudyId::new("b"), today);
//! assert!(matches!(result, Err(JanitorError::NotFound(_))));
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod janitor;

pub use config::{JanitorConfig, RequiredField};
pub use error::JanitorError;
pub use janitor::{month_of, EnrichmentEntry, Janitor, StaleReport};
