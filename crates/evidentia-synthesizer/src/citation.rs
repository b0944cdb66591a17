//! Citation view model handed to the content renderer

use crate::ranked_studies;
use evidentia_domain::{ClaimId, Snapshot, Study, StudyId};
use serde::Serialize;

/// Base of permanent study links
pub const DOI_LINK_BASE: &str = "https://doi.org/";

/// Everything a renderer needs to cite a study
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationView {
    /// Claim the citation backs
    pub claim: String,
    /// Cited study
    pub study_id: StudyId,
    /// Author line
    pub authors: String,
    /// Publication year
    pub year: i32,
    /// DOI, if any
    pub doi: Option<String>,
    /// Study type label
    pub study_type: Option<String>,
    /// Sample size as reported
    pub sample_size: Option<String>,
    /// Quality on the 0-14 scale
    pub quality_score: f64,
    /// Ranking value
    pub final_score: f64,
    /// One-line finding
    pub key_finding: Option<String>,
    /// Badge category slug, derived from the study type
    pub badge: String,
    /// Title, if known
    pub title: Option<String>,
    /// `"<authors> <year> · N=<sample>"`
    pub detail: String,
    /// `https://doi.org/<doi>`
    pub link: Option<String>,
    /// Headline citation for the claim
    pub featured: bool,
}

impl CitationView {
    /// Build the view of `study` as evidence for `claim`
    pub fn new(claim: &ClaimId, study: &Study, featured: bool) -> Self {
        let badge = study
            .study_type
            .map(|t| t.slug())
            .unwrap_or("study")
            .to_string();

        Self {
            claim: claim.to_string(),
            study_id: study.study_id.clone(),
            authors: study.authors.clone(),
            year: study.pub_year,
            doi: study.doi.clone(),
            study_type: study.study_type.map(|t| t.label().to_string()),
            sample_size: study.sample_size.clone(),
            quality_score: study.quality_score(),
            final_score: study.final_score(),
            key_finding: study.key_finding.clone(),
            badge,
            title: study.title.clone(),
            detail: format!(
                "{} {} · N={}",
                study.authors,
                study.pub_year,
                study.sample_size.as_deref().unwrap_or("?")
            ),
            link: study.doi.as_ref().map(|doi| format!("{}{}", DOI_LINK_BASE, doi)),
            featured,
        }
    }
}

/// Ranked citations for one claim; the best study is featured
pub fn citations_for_claim(snapshot: &Snapshot, claim: &ClaimId) -> Vec<CitationView> {
    ranked_studies(snapshot, claim, None)
        .into_iter()
        .enumerate()
        .map(|(i, linked)| CitationView::new(claim, linked.study, i == 0))
        .collect()
}

/// Citations for every linked claim, grouped by claim in id order
pub fn citations_for_all(snapshot: &Snapshot) -> Vec<CitationView> {
    let mut claims: Vec<&ClaimId> = snapshot.study_claims.iter().map(|l| &l.claim_id).collect();
    claims.sort();
    claims.dedup();

    claims
        .into_iter()
        .flat_map(|claim| citations_for_claim(snapshot, claim))
        .collect()
}
