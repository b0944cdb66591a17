//! Batch DOI audit over existing studies

use crate::{DoiFailure, DoiValidation, DoiValidator};
use evidentia_domain::{DoiResolver, Study, StudyId};
use std::thread;
use tracing::{info, warn};

/// Result of auditing one study
#[derive(Debug, Clone, PartialEq)]
pub enum AuditOutcome {
    /// DOI resolves and the title (if any) agrees
    Verified {
        /// Resolved title
        resolved_title: String,
    },
    /// Study has no DOI
    NoDoi,
    /// DOI did not resolve
    Failed(DoiFailure),
    /// DOI resolves to a different title
    Mismatched {
        /// Title on record
        expected: String,
        /// Title from the resolver
        resolved: String,
    },
}

impl AuditOutcome {
    fn from_validation(study: &Study, validation: DoiValidation) -> Self {
        if let Some(error) = validation.error {
            return AuditOutcome::Failed(error);
        }
        let resolved = validation.resolved_title().to_string();
        if validation.title_match == Some(false) {
            AuditOutcome::Mismatched {
                expected: study.title.clone().unwrap_or_default(),
                resolved,
            }
        } else {
            AuditOutcome::Verified {
                resolved_title: resolved,
            }
        }
    }
}

/// Tally of a batch audit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditReport {
    /// Studies whose DOI checked out
    pub verified: Vec<StudyId>,
    /// Studies without a DOI
    pub no_doi: Vec<StudyId>,
    /// Studies whose DOI failed to resolve, with the reason
    pub failed: Vec<(StudyId, DoiFailure)>,
    /// Studies whose DOI resolves to another title: (id, expected, resolved)
    pub mismatched: Vec<(StudyId, String, String)>,
}

impl AuditReport {
    /// Number of studies audited
    pub fn total(&self) -> usize {
        self.verified.len() + self.no_doi.len() + self.failed.len() + self.mismatched.len()
    }

    /// Whether every DOI checked out
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.mismatched.is_empty()
    }

    fn record(&mut self, study_id: &StudyId, outcome: &AuditOutcome) {
        match outcome {
            AuditOutcome::Verified { .. } => self.verified.push(study_id.clone()),
            AuditOutcome::NoDoi => self.no_doi.push(study_id.clone()),
            AuditOutcome::Failed(e) => self.failed.push((study_id.clone(), e.clone())),
            AuditOutcome::Mismatched { expected, resolved } => self.mismatched.push((
                study_id.clone(),
                expected.clone(),
                resolved.clone(),
            )),
        }
    }
}

impl<R: DoiResolver> DoiValidator<R> {
    /// Audit every study, pausing between resolver calls
    ///
    /// A failing study never stops the run. `on_result` sees each outcome as
    /// it is produced, for progress output.
    pub fn audit<'a, I, F>(&self, studies: I, mut on_result: F) -> AuditReport
    where
        I: IntoIterator<Item = &'a Study>,
        F: FnMut(&Study, &AuditOutcome),
    {
        let pause = self.config().rate_limit();
        let mut report = AuditReport::default();
        let mut first_call = true;

        for study in studies {
            let outcome = match study.doi.as_deref() {
                None => AuditOutcome::NoDoi,
                Some(doi) => {
                    if !first_call && !pause.is_zero() {
                        thread::sleep(pause);
                    }
                    first_call = false;
                    let validation = self.validate(doi, study.title.as_deref());
                    AuditOutcome::from_validation(study, validation)
                }
            };

            match &outcome {
                AuditOutcome::Verified { .. } => info!(study = %study.study_id, "DOI verified"),
                AuditOutcome::NoDoi => info!(study = %study.study_id, "no DOI"),
                AuditOutcome::Failed(e) => warn!(study = %study.study_id, error = %e, "DOI failed"),
                AuditOutcome::Mismatched { .. } => {
                    warn!(study = %study.study_id, "DOI resolves to a different title")
                }
            }

            report.record(&study.study_id, &outcome);
            on_result(study, &outcome);
        }

        info!(
            verified = report.verified.len(),
            no_doi = report.no_doi.len(),
            failed = report.failed.len(),
            mismatched = report.mismatched.len(),
            "DOI audit complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationConfig;
    use evidentia_domain::{Direction, Relevance, ResolveError, Score};
    use evidentia_resolver::MockResolver;

    fn study(id: &str, doi: Option<&str>, title: Option<&str>) -> Study {
        let mut s = Study::new(
            StudyId::new(id),
            "Author",
            2020,
            Score::new(10.0, Relevance::Full).unwrap(),
            Direction::Supports,
        );
        s.doi = doi.map(str::to_string);
        s.title = title.map(str::to_string);
        s
    }

    #[test]
    fn test_audit_tallies_every_outcome() {
        let resolver = MockResolver::new();
        resolver.add_title("10.1/ok", "Protein intake and mortality risk");
        resolver.add_title("10.1/other", "Sleep duration and dementia");
        resolver.add_error("10.1/down", ResolveError::Network("refused".to_string()));

        let validator = DoiValidator::new(
            resolver.clone(),
            ValidationConfig::default().with_rate_limit_ms(0),
        );

        let studies = vec![
            study("a", Some("10.1/ok"), Some("Protein Intake And Mortality Risk: A Cohort Study")),
            study("b", None, None),
            study("c", Some("10.1/down"), None),
            study("d", Some("10.1/other"), Some("Protein intake and mortality risk")),
            study("e", Some("10.1/missing"), None),
            study("f", Some("10.1/ok"), None),
        ];

        let mut seen = Vec::new();
        let report = validator.audit(&studies, |s, _| seen.push(s.study_id.clone()));

        assert_eq!(report.total(), 6);
        assert_eq!(seen.len(), 6);
        assert_eq!(report.verified, [StudyId::new("a"), StudyId::new("f")]);
        assert_eq!(report.no_doi, [StudyId::new("b")]);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.mismatched.len(), 1);
        assert_eq!(report.mismatched[0].0, StudyId::new("d"));
        assert!(!report.is_clean());
        // studies without a DOI never hit the resolver
        assert_eq!(resolver.call_count(), 5);
    }

    #[test]
    fn test_audit_of_empty_registry() {
        let validator = DoiValidator::new(MockResolver::new(), ValidationConfig::default());
        let report = validator.audit(Vec::<&Study>::new(), |_, _| {});
        assert_eq!(report.total(), 0);
        assert!(report.is_clean());
    }
}
