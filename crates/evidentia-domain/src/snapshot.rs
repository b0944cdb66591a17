//! The canonical registry snapshot owned by a repository

use crate::{
    Claim, ClaimId, Direction, DomainError, EvidenceUsage, RemovedStudy, Study, StudyClaimLink,
    StudyId, StudyStatus,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A study joined to a claim, annotated with its effective direction
#[derive(Debug, Clone, Copy)]
pub struct LinkedStudy<'a> {
    /// The study
    pub study: &'a Study,
    /// Link direction if set, else the study's own direction
    pub direction: Direction,
}

/// Everything the registry knows, loaded and saved as one unit
///
/// Record lists keep insertion order; reports that need a stable tie-break
/// rely on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// All studies, including superseded and retracted ones
    #[serde(default)]
    pub studies: Vec<Study>,
    /// Claim vocabulary
    #[serde(default)]
    pub claims: Vec<Claim>,
    /// Study↔claim edges
    #[serde(default)]
    pub study_claims: Vec<StudyClaimLink>,
    /// Citations in generated content
    #[serde(default)]
    pub evidence_usage: Vec<EvidenceUsage>,
    /// Retirement audit trail
    #[serde(default)]
    pub removed_studies: Vec<RemovedStudy>,
}

impl Snapshot {
    /// An empty, well-formed snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a study by id
    pub fn study(&self, id: &StudyId) -> Option<&Study> {
        self.studies.iter().find(|s| &s.study_id == id)
    }

    /// Look up a study by id for mutation
    pub fn study_mut(&mut self, id: &StudyId) -> Option<&mut Study> {
        self.studies.iter_mut().find(|s| &s.study_id == id)
    }

    /// Look up a study by DOI (case-insensitive, as DOIs are)
    pub fn study_by_doi(&self, doi: &str) -> Option<&Study> {
        self.studies
            .iter()
            .find(|s| s.doi.as_deref().is_some_and(|d| d.eq_ignore_ascii_case(doi)))
    }

    /// Look up a claim by id
    pub fn claim(&self, id: &ClaimId) -> Option<&Claim> {
        self.claims.iter().find(|c| &c.claim_id == id)
    }

    /// Add a study, rejecting duplicate ids and DOIs
    pub fn insert_study(&mut self, study: Study) -> Result<&Study, DomainError> {
        if self.study(&study.study_id).is_some() {
            return Err(DomainError::IntegrityConflict(format!(
                "study id {} already exists",
                study.study_id
            )));
        }
        if let Some(doi) = &study.doi {
            if let Some(existing) = self.study_by_doi(doi) {
                return Err(DomainError::IntegrityConflict(format!(
                    "DOI {} already belongs to {}",
                    doi, existing.study_id
                )));
            }
        }

        self.studies.push(study);
        let last = self.studies.len() - 1;
        Ok(&self.studies[last])
    }

    /// Add a claim unless it already exists
    ///
    /// An existing claim without a description picks up the new one.
    /// Returns `true` when the claim was created.
    pub fn ensure_claim(&mut self, claim_id: ClaimId, description: Option<String>) -> bool {
        if let Some(existing) = self.claims.iter_mut().find(|c| c.claim_id == claim_id) {
            if existing.description.is_none() {
                existing.description = description.filter(|d| !d.trim().is_empty());
            }
            return false;
        }

        self.claims.push(Claim::new(claim_id, description));
        true
    }

    /// Link a study to a claim
    ///
    /// Both ends must exist. Linking an already linked pair is a no-op and
    /// returns `false`.
    pub fn link(
        &mut self,
        study_id: &StudyId,
        claim_id: &ClaimId,
        direction: Option<Direction>,
    ) -> Result<bool, DomainError> {
        if self.study(study_id).is_none() {
            return Err(DomainError::study_not_found(study_id.as_str()));
        }
        if self.claim(claim_id).is_none() {
            return Err(DomainError::claim_not_found(claim_id.as_str()));
        }
        if self
            .study_claims
            .iter()
            .any(|l| &l.study_id == study_id && &l.claim_id == claim_id)
        {
            return Ok(false);
        }

        self.study_claims.push(StudyClaimLink {
            study_id: study_id.clone(),
            claim_id: claim_id.clone(),
            direction,
        });
        Ok(true)
    }

    /// Record where a study is cited
    pub fn add_usage(&mut self, usage: EvidenceUsage) -> Result<(), DomainError> {
        if self.study(&usage.study_id).is_none() {
            return Err(DomainError::study_not_found(usage.study_id.as_str()));
        }
        if self.evidence_usage.iter().any(|u| u.id == usage.id) {
            return Err(DomainError::IntegrityConflict(format!(
                "usage id {} already exists",
                usage.id
            )));
        }
        self.evidence_usage.push(usage);
        Ok(())
    }

    /// Append to the retirement audit trail
    pub fn record_removal(&mut self, removed: RemovedStudy) {
        self.removed_studies.push(removed);
    }

    /// Studies linked to a claim, in study insertion order
    pub fn linked_studies(&self, claim_id: &ClaimId) -> Vec<LinkedStudy<'_>> {
        let links: HashMap<&StudyId, Option<Direction>> = self
            .study_claims
            .iter()
            .filter(|l| &l.claim_id == claim_id)
            .map(|l| (&l.study_id, l.direction))
            .collect();

        self.studies
            .iter()
            .filter_map(|study| {
                links.get(&study.study_id).map(|direction| LinkedStudy {
                    study,
                    direction: direction.unwrap_or(study.direction),
                })
            })
            .collect()
    }

    /// Claims linked to a study
    pub fn claims_for_study(&self, study_id: &StudyId) -> Vec<&ClaimId> {
        self.study_claims
            .iter()
            .filter(|l| &l.study_id == study_id)
            .map(|l| &l.claim_id)
            .collect()
    }

    /// Claim ids containing `query` (case-insensitive), for "did you mean"
    pub fn suggest_claims(&self, query: &str) -> Vec<&ClaimId> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.claims
            .iter()
            .map(|c| &c.claim_id)
            .filter(|id| id.as_str().to_lowercase().contains(&needle))
            .collect()
    }

    /// Check the invariants every persisted snapshot must satisfy
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut ids = HashSet::new();
        let mut dois = HashMap::new();
        for study in &self.studies {
            if !ids.insert(&study.study_id) {
                return Err(DomainError::IntegrityConflict(format!(
                    "duplicate study id {}",
                    study.study_id
                )));
            }
            if let Some(doi) = &study.doi {
                if let Some(other) = dois.insert(doi.to_lowercase(), &study.study_id) {
                    return Err(DomainError::IntegrityConflict(format!(
                        "DOI {} shared by {} and {}",
                        doi, other, study.study_id
                    )));
                }
            }
        }

        for study in &self.studies {
            if let Some(replacement) = &study.superseded_by {
                if replacement == &study.study_id {
                    return Err(DomainError::Invalid(format!(
                        "study {} is superseded by itself",
                        study.study_id
                    )));
                }
                if !ids.contains(replacement) {
                    return Err(DomainError::study_not_found(replacement.as_str()));
                }
            } else if study.status == StudyStatus::Superseded {
                return Err(DomainError::Invalid(format!(
                    "study {} is superseded without a replacement",
                    study.study_id
                )));
            }
        }

        let claim_ids: HashSet<&ClaimId> = self.claims.iter().map(|c| &c.claim_id).collect();
        if claim_ids.len() != self.claims.len() {
            return Err(DomainError::IntegrityConflict("duplicate claim id".to_string()));
        }

        let mut pairs = HashSet::new();
        for link in &self.study_claims {
            if !ids.contains(&link.study_id) {
                return Err(DomainError::study_not_found(link.study_id.as_str()));
            }
            if !claim_ids.contains(&link.claim_id) {
                return Err(DomainError::claim_not_found(link.claim_id.as_str()));
            }
            if !pairs.insert((&link.study_id, &link.claim_id)) {
                return Err(DomainError::IntegrityConflict(format!(
                    "duplicate link {} ↔ {}",
                    link.study_id, link.claim_id
                )));
            }
        }

        for usage in &self.evidence_usage {
            if !ids.contains(&usage.study_id) {
                return Err(DomainError::study_not_found(usage.study_id.as_str()));
            }
        }

        Ok(())
    }
}
