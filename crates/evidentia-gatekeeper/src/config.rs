//! Gatekeeper configuration

use serde::Deserialize;
use std::time::Duration;

/// Configuration for DOI validation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject new studies that have no DOI at all
    pub require_doi: bool,

    /// Compare the expected title against the resolved one
    pub check_titles: bool,

    /// Pause between resolver calls during a batch audit, in milliseconds
    pub rate_limit_ms: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_doi: false,
            check_titles: true,
            rate_limit_ms: 1000,
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (no title check, no pacing)
    pub fn permissive() -> Self {
        Self {
            require_doi: false,
            check_titles: false,
            rate_limit_ms: 0,
        }
    }

    /// Create a strict configuration (every study needs a verified DOI)
    pub fn strict() -> Self {
        Self {
            require_doi: true,
            check_titles: true,
            rate_limit_ms: 1000,
        }
    }

    /// Set the audit pacing
    pub fn with_rate_limit_ms(mut self, rate_limit_ms: u64) -> Self {
        self.rate_limit_ms = rate_limit_ms;
        self
    }

    /// Audit pacing as a duration
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}
