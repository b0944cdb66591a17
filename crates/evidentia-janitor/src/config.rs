//! Configuration for Janitor operations
//!
//! Defines the re-verification window and the fields every study should carry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A field the enrichment audit expects to be filled in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    /// Publication title
    Title,
    /// Journal or venue
    Journal,
    /// DOI
    Doi,
    /// Study design
    StudyType,
    /// One-line summary of the finding
    KeyFinding,
    /// At least one effect estimate
    EffectSizes,
}

impl RequiredField {
    /// Every field, in report order
    pub const ALL: [RequiredField; 6] = [
        RequiredField::Title,
        RequiredField::Journal,
        RequiredField::Doi,
        RequiredField::StudyType,
        RequiredField::KeyFinding,
        RequiredField::EffectSizes,
    ];

    /// Field name as persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::Title => "title",
            RequiredField::Journal => "journal",
            RequiredField::Doi => "doi",
            RequiredField::StudyType => "study_type",
            RequiredField::KeyFinding => "key_finding",
            RequiredField::EffectSizes => "effect_sizes",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the Janitor
///
/// # Examples
///
/// ```
/// use evidentia_janitor::JanitorConfig;
///
/// // Default configuration: re-verify every 180 days
/// let config = JanitorConfig::default();
/// assert_eq!(config.stale_after_days, 180);
///
/// // Strict: re-verify every 90 days
/// assert_eq!(JanitorConfig::strict().stale_after_days, 90);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JanitorConfig {
    /// A study not verified within this many days is stale
    /// Default: 180 days
    pub stale_after_days: u32,

    /// Fields the enrichment audit reports as missing
    /// Default: all of [`RequiredField::ALL`]
    pub required_fields: Vec<RequiredField>,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            stale_after_days: 180,
            required_fields: RequiredField::ALL.to_vec(),
        }
    }
}

impl JanitorConfig {
    /// Strict configuration (quarterly re-verification)
    pub fn strict() -> Self {
        Self {
            stale_after_days: 90,
            ..Self::default()
        }
    }

    /// Lenient configuration (yearly re-verification, DOI and finding only)
    pub fn lenient() -> Self {
        Self {
            stale_after_days: 365,
            required_fields: vec![RequiredField::Doi, RequiredField::KeyFinding],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = JanitorConfig::default();
        assert_eq!(config.stale_after_days, 180);
        assert_eq!(config.required_fields.len(), 6);
    }

    #[test]
    fn test_presets_order() {
        assert!(JanitorConfig::strict().stale_after_days < JanitorConfig::default().stale_after_days);
        assert!(JanitorConfig::lenient().stale_after_days > JanitorConfig::default().stale_after_days);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: JanitorConfig = serde_json::from_str(r#"{"stale_after_days": 30}"#).unwrap();
        assert_eq!(config.stale_after_days, 30);
        assert_eq!(config.required_fields, RequiredField::ALL.to_vec());

        let config: JanitorConfig =
            serde_json::from_str(r#"{"required_fields": ["doi", "effect_sizes"]}"#).unwrap();
        assert_eq!(
            config.required_fields,
            [RequiredField::Doi, RequiredField::EffectSizes]
        );
    }

    #[test]
    fn test_unknown_field_name_rejected() {
        assert!(serde_json::from_str::<JanitorConfig>(r#"{"required_fields": ["color"]}"#).is_err());
    }
}
