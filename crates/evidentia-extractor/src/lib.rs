//! Evidentia Extractor
//!
//! Bulk import of studies, claims, and usages from the two semi-structured
//! sources the registry grew out of.
//!
//! # Overview
//!
//! - **Markdown registry**: a `## Claim Tag Vocabulary` table followed by
//!   one study table per content section. Each study row carries twelve
//!   columns: authors, year (or age), DOI, type, sample size, combined
//!   score, landmark flag, direction, population, claim tags, usage
//!   notation, and key finding.
//! - **Evidence page references**: the `studyRefs` HTML of each card in a
//!   page's JSON document.
//!
//! # Architecture
//!
//! ```text
//! text → parser / refs → (Study, [ClaimId], [UsageRef]) → Importer → Snapshot
//! ```
//!
//! Parsing is pure; only [`Importer`] touches the snapshot, and it never
//! aborts on a single bad row.
//!
//! # Example Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use evidentia_domain::Snapshot;
//! use evidentia_extractor::Importer;
//!
//! let text = "\
//! ### Protein
//! | Morton | 2018 | 10.1136/bjsports-2017-097608 | MA | 1863 | 13 | Y | + | all | `protein→muscle` | q1(F) | Gains plateau at 1.6 g/kg |
//! ";
//!
//! let importer = Importer::default_config();
//! let mut snapshot = Snapshot::new();
//! let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
//!
//! let report = importer.import_markdown(&mut snapshot, text, today).unwrap();
//! assert_eq!(report.studies_added, 1);
//! assert_eq!(report.links_added, 1);
//!
//! // Same DOI again: nothing new
//! let again = importer.import_markdown(&mut snapshot, text, today).unwrap();
//! assert_eq!(again.duplicates_skipped, 1);
//! assert_eq!(snapshot.studies.len(), 1);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod importer;
mod parser;
mod refs;
mod types;


pub use config::{ImportConfig, DEFAULT_REFERENCE_YEAR};
pub use error::ImportError;
pub use importer::Importer;
pub use parser::{
    parse_claim_tags, parse_registry, parse_score, parse_used_in, parse_year, STUDY_COLUMNS,
    VOCABULARY_HEADER,
};
pub use refs::{parse_evidence_page, PageRefs};
pub use types::{
    ImportReport, PageRef, ParsedRegistry, ParsedRow, RowFailure, UsageRef, VocabularyEntry,
};
