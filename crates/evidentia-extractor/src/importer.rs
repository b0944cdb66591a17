//! Core Importer implementation

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::parser::parse_registry;
use crate::refs::parse_evidence_page;
use crate::types::{ImportReport, RowFailure};
use chrono::NaiveDate;
use evidentia_domain::{
    normalize_doi, Direction, EvidenceUsage, Score, Snapshot, Study, StudyId, UsageRole,
};
use tracing::{debug, info, warn};

/// Bulk loader for registry tables and evidence page references
///
/// Imports are idempotent for studies with a DOI: a study whose DOI is
/// already registered is skipped along with its links and usages. A study
/// without a DOI is always imported, since distinct papers routinely share
/// an author line and year.
pub struct Importer {
    config: ImportConfig,
}

impl Importer {
    /// Create a new Importer
    pub fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    /// Create an Importer with default configuration
    pub fn default_config() -> Self {
        Self::new(ImportConfig::default())
    }

    /// Active configuration
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Import a markdown registry document into `snapshot`
    ///
    /// Bad rows never abort the batch; they are reported with their line.
    ///
    /// # Errors
    ///
    /// - [`ImportError::Config`] when the configuration is invalid
    /// - [`ImportError::Parse`] when the document has neither a claim
    ///   vocabulary nor any study section
    pub fn import_markdown(
        &self,
        snapshot: &mut Snapshot,
        text: &str,
        today: NaiveDate,
    ) -> Result<ImportReport, ImportError> {
        self.config.validate().map_err(ImportError::Config)?;

        let parsed = parse_registry(text, &self.config, today);
        if parsed.vocabulary.is_empty() && parsed.rows.is_empty() && parsed.failures.is_empty() {
            return Err(ImportError::Parse(
                "no claim vocabulary or study table found".to_string(),
            ));
        }

        let mut report = ImportReport {
            failures: parsed.failures,
            ..ImportReport::default()
        };

        for entry in parsed.vocabulary {
            if snapshot.ensure_claim(entry.claim_id, entry.description) {
                report.claims_added += 1;
            }
        }

        for row in parsed.rows {
            if let Some(existing) = find_registered(snapshot, &row.study) {
                debug!(line = row.line, study = %existing, "already registered, skipping");
                report.duplicates_skipped += 1;
                continue;
            }

            if let Some(similar) = doiless_namesake(snapshot, &row.study) {
                warn!(
                    line = row.line,
                    study = %similar,
                    "possible duplicate without DOI, importing anyway"
                );
            }

            let study_id = row.study.study_id.clone();
            if let Err(e) = snapshot.insert_study(row.study) {
                warn!(line = row.line, error = %e, "study rejected");
                report.failures.push(RowFailure::at_line(row.line, e.to_string()));
                continue;
            }
            report.studies_added += 1;

            for claim in row.claims {
                if snapshot.ensure_claim(claim.clone(), None) {
                    report.claims_added += 1;
                }
                if snapshot.link(&study_id, &claim, None)? {
                    report.links_added += 1;
                }
            }

            for usage in row.usages {
                snapshot.add_usage(EvidenceUsage::new(
                    study_id.clone(),
                    usage.page_file,
                    usage.card_id,
                    usage.role,
                ))?;
                report.usages_added += 1;
            }
        }

        info!(
            added = report.studies_added,
            skipped = report.duplicates_skipped,
            failed = report.failures.len(),
            claims = snapshot.claims.len(),
            "registry import complete"
        );
        Ok(report)
    }

    /// Import the references cited on one evidence page
    ///
    /// `page` is the page slug; `json` the page's card document. Unseen
    /// references become unscored supporting studies. Every reference,
    /// new or known, is recorded as a supporting usage on
    /// `<page>-evidence.html` at its card unless that usage already exists.
    ///
    /// # Errors
    ///
    /// [`ImportError::JsonParse`] when `json` is not a card document.
    pub fn import_refs(
        &self,
        snapshot: &mut Snapshot,
        page: &str,
        json: &str,
        today: NaiveDate,
    ) -> Result<ImportReport, ImportError> {
        let parsed = parse_evidence_page(json)?;
        let page_file = format!("{}-evidence.html", page);
        let mut report = ImportReport {
            failures: parsed.failures,
            ..ImportReport::default()
        };

        for page_ref in parsed.refs {
            let mut study = Study::new(
                StudyId::generate(&page_ref.authors, page_ref.year),
                page_ref.authors.as_str(),
                page_ref.year,
                Score::unscored(),
                Direction::Supports,
            );
            study.doi = page_ref.doi.as_deref().and_then(normalize_doi);

            let study_id = match find_registered(snapshot, &study) {
                Some(existing) => {
                    report.duplicates_skipped += 1;
                    existing
                }
                None => {
                    study.title = page_ref.title;
                    study.verified_date = Some(today.format("%Y-%m").to_string());
                    study.added_date = Some(today.format("%Y-%m-%d").to_string());
                    study.notes = Some(format!(
                        "Auto-imported from {}.json card {}",
                        page, page_ref.card_id
                    ));
                    let id = study.study_id.clone();
                    snapshot.insert_study(study)?;
                    report.studies_added += 1;
                    info!(study = %id, card = %page_ref.card_id, "imported reference");
                    id
                }
            };

            let already_cited = snapshot.evidence_usage.iter().any(|u| {
                u.study_id == study_id && u.page_file == page_file && u.card_id == page_ref.card_id
            });
            if !already_cited {
                snapshot.add_usage(EvidenceUsage::new(
                    study_id,
                    page_file.as_str(),
                    page_ref.card_id,
                    UsageRole::Supporting,
                ))?;
                report.usages_added += 1;
            }
        }

        info!(
            page,
            added = report.studies_added,
            usages = report.usages_added,
            "reference import complete"
        );
        Ok(report)
    }
}

/// Id of the registered study sharing `candidate`'s DOI, if any
fn find_registered(snapshot: &Snapshot, candidate: &Study) -> Option<StudyId> {
    let doi = candidate.doi.as_deref()?;
    snapshot.study_by_doi(doi).map(|s| s.study_id.clone())
}

/// A DOI-less study with the same author line and year as `candidate`
fn doiless_namesake<'a>(snapshot: &'a Snapshot, candidate: &Study) -> Option<&'a StudyId> {
    if candidate.doi.is_some() {
        return None;
    }
    snapshot
        .studies
        .iter()
        .find(|s| {
            s.doi.is_none()
                && s.pub_year == candidate.pub_year
                && s.authors.eq_ignore_ascii_case(&candidate.authors)
        })
        .map(|s| &s.study_id)
}
