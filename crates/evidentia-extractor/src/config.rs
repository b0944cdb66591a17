//! Configuration for the Importer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Year subtracted from when the year column holds an age
pub const DEFAULT_REFERENCE_YEAR: i32 = 2026;

const DEFAULT_SECTIONS: &[(&str, &str)] = &[
    ("Sleep", "sleep"),
    ("Mindset", "mindset"),
    ("Wellbeing", "wellbeing"),
    ("Nutrition", "nutrition"),
    ("Protein", "protein"),
    ("VO2max", "vo2max"),
    ("Muscle Strength", "muscle"),
];

/// Configuration for the Importer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Year the registry table was written; a year column below 1000 is
    /// read as an age relative to it
    pub reference_year: i32,

    /// `## <header>` → page slug for the study tables
    pub sections: BTreeMap<String, String>,
}

impl ImportConfig {
    /// Page slug for a section header, if it holds studies
    pub fn page_for(&self, header: &str) -> Option<&str> {
        self.sections.get(header.trim()).map(String::as_str)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.reference_year < 1000 {
            return Err("reference_year must be a four-digit year".to_string());
        }
        if let Some((header, _)) = self.sections.iter().find(|(_, page)| page.trim().is_empty()) {
            return Err(format!("section '{}' maps to an empty page", header));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            reference_year: DEFAULT_REFERENCE_YEAR,
            sections: DEFAULT_SECTIONS
                .iter()
                .map(|(header, page)| (header.to_string(), page.to_string()))
                .collect(),
        }
    }
}
