//! Evidentia Synthesizer
//!
//! Turns individually scored studies into a per-claim consensus.
//!
//! For every claim the synthesizer partitions linked studies by effective
//! direction (the link's direction when set, else the study's own), ranks
//! each partition by final score, and derives:
//! - a net direction, contested when support and contradiction coexist
//! - a confidence tier from the best study behind the claim
//! - a gap flag naming the kind of evidence still missing
//!
//! Everything here is a pure read over a [`Snapshot`](evidentia_domain::Snapshot).
//!
//! # Examples
//!
//! ```
//! use evidentia_domain::Snapshot;
//! use evidentia_synthesizer::summarize;
//!
//! let snapshot = Snapshot::new();
//! assert!(summarize(&snapshot).is_empty());
//! ```

#![warn(missing_docs)]

mod citation;
mod gaps;
mod markdown;
mod synthesis;

use thiserror::Error;

pub use citation::{citations_for_all, citations_for_claim, CitationView, DOI_LINK_BASE};
pub use gaps::{gap_report, GapEntry, GapReport, MIN_SUPPORTING};
pub use markdown::{render_summary_table, splice_summary_table, TABLE_HEADER};
pub use synthesis::{
    ranked, ranked_studies, summarize, synthesize, ClaimSynthesis, Confidence, Gap, NetDirection,
    SummaryRow, MODERATE_THRESHOLD, NONE_MARKER, STRONG_THRESHOLD,
};

/// Errors that can occur while exporting synthesized reports
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// The target document has no claim summary table to replace
    #[error("Could not find the Claim Summary Index table")]
    SummaryTableMissing,

    /// The table locator failed to compile
    #[error("Invalid table pattern: {0}")]
    Pattern(String),
}
