//! Parsed records and import reports

use evidentia_domain::{ClaimId, Study, UsageRole};
use serde::Serialize;

/// One citation of a study on an evidence page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRef {
    /// Page file, e.g. `sleep-evidence.html`
    pub page_file: String,
    /// Card anchor, e.g. `q3`
    pub card_id: String,
    /// Citation role
    pub role: UsageRole,
}

/// A study row decoded from a registry table
#[derive(Debug, Clone)]
pub struct ParsedRow {
    /// 1-based line in the source document
    pub line: usize,
    /// The study, with a freshly generated id
    pub study: Study,
    /// Claim tags the study backs
    pub claims: Vec<ClaimId>,
    /// Pages citing the study
    pub usages: Vec<UsageRef>,
}

/// A claim from the vocabulary table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyEntry {
    /// Claim tag
    pub claim_id: ClaimId,
    /// Description column
    pub description: Option<String>,
}

/// Everything decoded from one markdown registry document
#[derive(Debug, Clone, Default)]
pub struct ParsedRegistry {
    /// Claim vocabulary, in table order
    pub vocabulary: Vec<VocabularyEntry>,
    /// Study rows, in document order
    pub rows: Vec<ParsedRow>,
    /// Rows that could not be decoded
    pub failures: Vec<RowFailure>,
}

/// A reference scraped from an evidence page card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    /// Card the reference sits on
    pub card_id: String,
    /// Reference marker number (`[n]`)
    pub number: u32,
    /// Author line
    pub authors: String,
    /// Publication year
    pub year: i32,
    /// Quoted title, if present
    pub title: Option<String>,
    /// DOI from the reference link, if present
    pub doi: Option<String>,
}

/// A row or reference that was not imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    /// Where it came from: a line number or a card id
    pub location: String,
    /// Why it was rejected
    pub reason: String,
}

impl RowFailure {
    /// Failure at a 1-based source line
    pub fn at_line(line: usize, reason: impl Into<String>) -> Self {
        Self {
            location: format!("line {}", line),
            reason: reason.into(),
        }
    }

    /// Failure on an evidence page card
    pub fn at_card(card_id: &str, reason: impl Into<String>) -> Self {
        Self {
            location: format!("card {}", card_id),
            reason: reason.into(),
        }
    }
}

/// Outcome of an import batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    /// New studies
    pub studies_added: usize,
    /// Rows skipped because the study is already registered
    pub duplicates_skipped: usize,
    /// New claims
    pub claims_added: usize,
    /// New study-claim links
    pub links_added: usize,
    /// New evidence usages
    pub usages_added: usize,
    /// Rows that could not be imported
    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    /// Whether every row was imported or recognized as a duplicate
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
