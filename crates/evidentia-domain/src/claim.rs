//! Claim module - the exposure→outcome propositions evidence is weighed against

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between exposure and outcome in a claim key
pub const CLAIM_SEPARATOR: char = '→';

/// Identifier of a claim, literally `"<exposure>→<outcome>"`
///
/// Claim identity is an opaque key supplied by the operator. The only
/// structure enforced is that both sides of the separator are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClaimId(String);

impl ClaimId {
    /// Parse a claim key, normalizing the ASCII `->` alias to `→`
    ///
    /// # Examples
    ///
    /// ```
    /// use evidentia_domain::ClaimId;
    ///
    /// let id = ClaimId::parse("protein -> mortality").unwrap();
    /// assert_eq!(id.as_str(), "protein→mortality");
    /// assert_eq!(id.exposure(), "protein");
    /// assert_eq!(id.outcome(), "mortality");
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        let normalized = s.trim().replace("->", "→");
        let (exposure, outcome) = normalized
            .split_once(CLAIM_SEPARATOR)
            .ok_or_else(|| format!("Invalid claim id '{}': expected exposure→outcome", s))?;

        let exposure = exposure.trim();
        let outcome = outcome.trim();
        if exposure.is_empty() || outcome.is_empty() {
            return Err(format!("Invalid claim id '{}': empty exposure or outcome", s));
        }

        Ok(Self(format!("{}{}{}", exposure, CLAIM_SEPARATOR, outcome)))
    }

    /// The full key
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Left-hand side of the key
    pub fn exposure(&self) -> &str {
        self.0
            .split_once(CLAIM_SEPARATOR)
            .map(|(exposure, _)| exposure)
            .unwrap_or(&self.0)
    }

    /// Right-hand side of the key
    pub fn outcome(&self) -> &str {
        self.0
            .split_once(CLAIM_SEPARATOR)
            .map(|(_, outcome)| outcome)
            .unwrap_or("")
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ClaimId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClaimId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClaimId> for String {
    fn from(id: ClaimId) -> Self {
        id.0
    }
}

/// A claim under evidence review
///
/// `exposure` and `outcome` are derived copies of the key. They are exposed
/// read-only so they can never drift from `claim_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ClaimRecord", into = "ClaimRecord")]
pub struct Claim {
    /// Composite key
    pub claim_id: ClaimId,

    /// Optional human description
    pub description: Option<String>,
}

impl Claim {
    /// Create a new claim
    pub fn new(claim_id: ClaimId, description: Option<String>) -> Self {
        Self {
            claim_id,
            description: description.filter(|d| !d.trim().is_empty()),
        }
    }

    /// Exposure side of the claim
    pub fn exposure(&self) -> &str {
        self.claim_id.exposure()
    }

    /// Outcome side of the claim
    pub fn outcome(&self) -> &str {
        self.claim_id.outcome()
    }
}

/// Persisted flat layout of a claim
///
/// The redundant `exposure`/`outcome` columns are written for readers of the
/// raw document but ignored on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Composite key
    pub claim_id: ClaimId,
    /// Derived exposure
    #[serde(default)]
    pub exposure: String,
    /// Derived outcome
    #[serde(default)]
    pub outcome: String,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
}

impl From<ClaimRecord> for Claim {
    fn from(record: ClaimRecord) -> Self {
        Claim::new(record.claim_id, record.description)
    }
}

impl From<Claim> for ClaimRecord {
    fn from(claim: Claim) -> Self {
        ClaimRecord {
            exposure: claim.exposure().to_string(),
            outcome: claim.outcome().to_string(),
            claim_id: claim.claim_id,
            description: claim.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_id_parts() {
        let id = ClaimId::parse("sleep-duration→mortality").unwrap();
        assert_eq!(id.exposure(), "sleep-duration");
        assert_eq!(id.outcome(), "mortality");
        assert_eq!(id.to_string(), "sleep-duration→mortality");
    }

    #[test]
    fn test_claim_id_invalid() {
        assert!(ClaimId::parse("protein").is_err());
        assert!(ClaimId::parse("→mortality").is_err());
        assert!(ClaimId::parse("protein→ ").is_err());
        assert!(ClaimId::parse("").is_err());
    }

    #[test]
    fn test_claim_id_ordering_is_lexicographic() {
        let a = ClaimId::parse("alcohol→mortality").unwrap();
        let b = ClaimId::parse("protein→mortality").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_derived_fields_follow_key_on_load() {
        let json = r#"{"claim_id":"protein→cancer","exposure":"stale","outcome":"stale","description":""}"#;
        let claim: Claim = serde_json::from_str(json).unwrap();
        assert_eq!(claim.exposure(), "protein");
        assert_eq!(claim.outcome(), "cancer");
        assert_eq!(claim.description, None);

        let value = serde_json::to_value(&claim).unwrap();
        assert_eq!(value["exposure"], "protein");
        assert_eq!(value["outcome"], "cancer");
    }
}
