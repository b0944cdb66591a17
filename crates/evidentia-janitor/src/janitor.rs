//! Core Janitor implementation: staleness, lifecycle transitions, enrichment

use crate::{JanitorConfig, JanitorError, RequiredField};
use chrono::{Days, NaiveDate};
use evidentia_domain::{RemovedStudy, Snapshot, Study, StudyId, StudyStatus};
use tracing::info;

/// Year-month form used by `verified_date`
pub fn month_of(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Studies due for re-verification
#[derive(Debug, Clone)]
pub struct StaleReport<'a> {
    /// Verification month at or before which a study is stale
    pub cutoff: String,
    /// Stale studies, never-verified first, then oldest verification first
    pub studies: Vec<&'a Study>,
}

/// A study missing required fields
#[derive(Debug, Clone)]
pub struct EnrichmentEntry<'a> {
    /// The incomplete study
    pub study: &'a Study,
    /// Fields that are missing or empty
    pub missing: Vec<RequiredField>,
}

/// Janitor for registry upkeep
///
/// Read-side reports (staleness, enrichment) borrow the snapshot; lifecycle
/// transitions mutate it in place and leave saving to the caller.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use evidentia_domain::Snapshot;
/// use evidentia_janitor::Janitor;
///
/// let janitor = Janitor::default_config();
/// let snapshot = Snapshot::new();
/// let today = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
///
/// let report = janitor.stale_report(&snapshot, today);
/// assert_eq!(report.cutoff, "2025-01");
/// assert!(report.studies.is_empty());
/// ```
pub struct Janitor {
    config: JanitorConfig,
}

impl Janitor {
    /// Create a new Janitor with the given configuration
    pub fn new(config: JanitorConfig) -> Self {
        Self { config }
    }

    /// Create a Janitor with default configuration
    pub fn default_config() -> Self {
        Self::new(JanitorConfig::default())
    }

    /// Active configuration
    pub fn config(&self) -> &JanitorConfig {
        &self.config
    }

    /// Month-granular cutoff: `today − stale_after_days`, as `YYYY-MM`
    pub fn stale_cutoff(&self, today: NaiveDate) -> String {
        let cutoff = today
            .checked_sub_days(Days::new(u64::from(self.config.stale_after_days)))
            .unwrap_or(NaiveDate::MIN);
        month_of(cutoff)
    }

    /// Whether `study` needs re-verification
    ///
    /// Comparison is on the `YYYY-MM` strings, so a study verified in the
    /// cutoff month itself is already stale.
    pub fn is_stale(study: &Study, cutoff: &str) -> bool {
        match study.verified_date.as_deref() {
            None => true,
            Some(verified) => verified <= cutoff,
        }
    }

    /// Every stale study, never-verified first, then oldest first
    pub fn stale_report<'a>(&self, snapshot: &'a Snapshot, today: NaiveDate) -> StaleReport<'a> {
        let cutoff = self.stale_cutoff(today);
        let mut studies: Vec<&Study> = snapshot
            .studies
            .iter()
            .filter(|s| Self::is_stale(s, &cutoff))
            .collect();
        studies.sort_by(|a, b| a.verified_date.cmp(&b.verified_date));

        StaleReport { cutoff, studies }
    }

    /// Mark `old` as superseded by `new`
    ///
    /// # Errors
    ///
    /// - [`JanitorError::InvalidTransition`] if `old == new`, if `old` is
    ///   retracted, or if `new` is itself retired
    /// - [`JanitorError::NotFound`] if either study is absent
    pub fn supersede(
        &self,
        snapshot: &mut Snapshot,
        old: &StudyId,
        new: &StudyId,
        today: NaiveDate,
    ) -> Result<(), JanitorError> {
        if old == new {
            return Err(JanitorError::InvalidTransition(format!(
                "{} cannot supersede itself",
                old
            )));
        }

        let replacement = snapshot
            .study(new)
            .ok_or_else(|| JanitorError::NotFound(new.to_string()))?;
        if !replacement.is_active() {
            return Err(JanitorError::InvalidTransition(format!(
                "replacement {} is {}",
                new,
                replacement.status.as_str()
            )));
        }

        let study = snapshot
            .study_mut(old)
            .ok_or_else(|| JanitorError::NotFound(old.to_string()))?;
        if study.status == StudyStatus::Retracted {
            return Err(JanitorError::InvalidTransition(format!(
                "{} is retracted",
                old
            )));
        }

        study.status = StudyStatus::Superseded;
        study.superseded_by = Some(new.clone());
        let removed = RemovedStudy {
            study_id: study.study_id.clone(),
            authors: study.authors.clone(),
            pub_year: study.pub_year,
            doi: study.doi.clone(),
            removed_from: None,
            replaced_by: Some(new.clone()),
            reason: format!("Superseded by {}", new),
            removed_date: today.format("%Y-%m-%d").to_string(),
        };
        snapshot.record_removal(removed);

        info!(old = %old, new = %new, "study superseded");
        Ok(())
    }

    /// Retract a study, recording why in the audit trail
    ///
    /// # Errors
    ///
    /// - [`JanitorError::NotFound`] if the study is absent
    /// - [`JanitorError::InvalidTransition`] if it is already retracted
    pub fn retract(
        &self,
        snapshot: &mut Snapshot,
        id: &StudyId,
        reason: &str,
        today: NaiveDate,
    ) -> Result<(), JanitorError> {
        let study = snapshot
            .study_mut(id)
            .ok_or_else(|| JanitorError::NotFound(id.to_string()))?;
        if study.status == StudyStatus::Retracted {
            return Err(JanitorError::InvalidTransition(format!(
                "{} is already retracted",
                id
            )));
        }

        let replaced_by = study.superseded_by.take();
        study.status = StudyStatus::Retracted;
        let removed = RemovedStudy {
            study_id: study.study_id.clone(),
            authors: study.authors.clone(),
            pub_year: study.pub_year,
            doi: study.doi.clone(),
            removed_from: None,
            replaced_by,
            reason: reason.trim().to_string(),
            removed_date: today.format("%Y-%m-%d").to_string(),
        };
        snapshot.record_removal(removed);

        info!(study = %id, reason, "study retracted");
        Ok(())
    }

    /// Refresh `verified_date` to the month of `today`
    pub fn reverify(
        &self,
        snapshot: &mut Snapshot,
        id: &StudyId,
        today: NaiveDate,
    ) -> Result<(), JanitorError> {
        let study = snapshot
            .study_mut(id)
            .ok_or_else(|| JanitorError::NotFound(id.to_string()))?;
        study.verified_date = Some(month_of(today));

        info!(study = %id, verified = %month_of(today), "study re-verified");
        Ok(())
    }

    /// Fields from the configured set that `study` lacks
    pub fn missing_fields(&self, study: &Study) -> Vec<RequiredField> {
        fn blank(value: &Option<String>) -> bool {
            value.as_deref().map_or(true, |v| v.trim().is_empty())
        }

        self.config
            .required_fields
            .iter()
            .copied()
            .filter(|field| match field {
                RequiredField::Title => blank(&study.title),
                RequiredField::Journal => blank(&study.journal),
                RequiredField::Doi => blank(&study.doi),
                RequiredField::StudyType => study.study_type.is_none(),
                RequiredField::KeyFinding => blank(&study.key_finding),
                RequiredField::EffectSizes => study.effect_sizes.is_empty(),
            })
            .collect()
    }

    /// Incomplete studies, most missing fields first
    pub fn enrichment_report<'a>(&self, snapshot: &'a Snapshot) -> Vec<EnrichmentEntry<'a>> {
        let mut entries: Vec<EnrichmentEntry<'a>> = snapshot
            .studies
            .iter()
            .filter_map(|study| {
                let missing = self.missing_fields(study);
                (!missing.is_empty()).then_some(EnrichmentEntry { study, missing })
            })
            .collect();
        entries.sort_by(|a, b| b.missing.len().cmp(&a.missing.len()));
        entries
    }
}
