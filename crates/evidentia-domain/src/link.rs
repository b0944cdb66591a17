//! Edges between studies, claims, and the content that cites them

use crate::{ClaimId, Direction, StudyId};
use serde::{Deserialize, Serialize};

/// Many-to-many edge between a study and a claim
///
/// One study can support claim A while contradicting claim B, so the link
/// may carry its own direction. When absent the study's direction applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyClaimLink {
    /// Linked study
    pub study_id: StudyId,
    /// Linked claim
    pub claim_id: ClaimId,
    /// Per-claim direction override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl StudyClaimLink {
    /// Create a link that inherits the study's direction
    pub fn new(study_id: StudyId, claim_id: ClaimId) -> Self {
        Self {
            study_id,
            claim_id,
            direction: None,
        }
    }

    /// Set a per-claim direction
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// Role a study plays on a content card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageRole {
    /// Headline citation on the card
    Featured,
    /// Additional citation
    #[default]
    Supporting,
}

impl UsageRole {
    /// Role name as persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageRole::Featured => "featured",
            UsageRole::Supporting => "supporting",
        }
    }

    /// Parse a persisted role name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "featured" | "f" => Some(UsageRole::Featured),
            "supporting" | "s" => Some(UsageRole::Supporting),
            _ => None,
        }
    }
}

/// Where a study is cited in generated content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceUsage {
    /// Record id
    pub id: String,
    /// Cited study
    pub study_id: StudyId,
    /// Page file, e.g. `sleep-evidence.html`
    pub page_file: String,
    /// Card anchor on the page, e.g. `q3`
    pub card_id: String,
    /// Citation role
    #[serde(default)]
    pub role: UsageRole,
}

impl EvidenceUsage {
    /// Create a usage record with a fresh id
    pub fn new(
        study_id: StudyId,
        page_file: impl Into<String>,
        card_id: impl Into<String>,
        role: UsageRole,
    ) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        Self {
            id: id[..12].to_string(),
            study_id,
            page_file: page_file.into(),
            card_id: card_id.into(),
            role,
        }
    }
}

/// Append-only audit record of a retired study
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedStudy {
    /// Retired study
    pub study_id: StudyId,
    /// Author line at retirement
    pub authors: String,
    /// Publication year
    pub pub_year: i32,
    /// DOI, if any
    #[serde(default)]
    pub doi: Option<String>,
    /// Where the study was removed from (page, registry section, ...)
    #[serde(default)]
    pub removed_from: Option<String>,
    /// Replacement study, if any
    #[serde(default)]
    pub replaced_by: Option<StudyId>,
    /// Why it was retired
    pub reason: String,
    /// `YYYY-MM-DD`
    pub removed_date: String,
}
