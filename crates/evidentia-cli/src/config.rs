//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use evidentia_domain::CategoryMap;
use evidentia_extractor::ImportConfig;
use evidentia_gatekeeper::ValidationConfig;
use evidentia_janitor::JanitorConfig;
use evidentia_resolver::{
    DoiOrgResolver, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};
use evidentia_store::Backend;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where studies are persisted
    #[serde(default)]
    pub store: StoreSettings,

    /// DOI resolution
    #[serde(default)]
    pub resolver: ResolverSettings,

    /// Staleness window and required fields
    #[serde(default)]
    pub janitor: JanitorConfig,

    /// Markdown import settings
    #[serde(default)]
    pub import: ImportConfig,

    /// Extra `category = [exposure, ...]` groups on top of the built-in ones
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,

    /// Output settings
    #[serde(default)]
    pub output: Settings,
}

/// Store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Store path
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// `json` or `sqlite`; inferred from the path when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

/// DOI resolver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Resolver endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent to the resolver
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Pause between calls during `verify-dois`, in milliseconds
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,

    /// Refuse to add studies without a DOI
    #[serde(default)]
    pub require_doi: bool,

    /// Attempts per DOI; transport failures and 5xx responses are retried
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Wait before the first retry in milliseconds, doubled per retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".evidentia").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist; a missing file at the default location
    /// means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::load_from(path)
            }
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.import.validate().map_err(CliError::Config)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Backend named in the config, if any.
    pub fn backend(&self) -> Result<Option<Backend>> {
        self.store
            .backend
            .as_deref()
            .map(|name| Backend::parse(name).map_err(|e| CliError::Config(e.to_string())))
            .transpose()
    }

    /// Built-in categories extended with the configured ones.
    pub fn category_map(&self) -> CategoryMap {
        let mut map = CategoryMap::default();
        map.extend(&self.categories);
        map
    }

    /// Validation settings for the DOI gate and audit.
    pub fn validation(&self) -> ValidationConfig {
        ValidationConfig {
            require_doi: self.resolver.require_doi,
            check_titles: true,
            rate_limit_ms: self.resolver.rate_limit_ms,
        }
    }

    /// HTTP resolver built from the resolver settings.
    pub fn resolver(&self) -> Result<DoiOrgResolver> {
        Ok(DoiOrgResolver::new(
            self.resolver.base_url.as_str(),
            Duration::from_secs(self.resolver.timeout_secs),
            &self.resolver.user_agent,
        )?
        .with_max_retries(self.resolver.max_retries)
        .with_retry_backoff(Duration::from_millis(self.resolver.retry_backoff_ms)))
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            backend: None,
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            rate_limit_ms: default_rate_limit_ms(),
            require_doi: false,
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("studies.json")
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_rate_limit_ms() -> u64 {
    1000
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidentia_domain::ClaimId;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store.path, PathBuf::from("studies.json"));
        assert_eq!(config.resolver.base_url, "https://doi.org");
        assert_eq!(config.resolver.max_retries, 1);
        assert_eq!(config.janitor.stale_after_days, 180);
        assert!(config.output.color);
        assert!(config.backend().unwrap().is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[store]\npath = \"registry.db\"\nbackend = \"sqlite\"\n\n[janitor]\nstale_after_days = 90\n\n[categories]\nheart = [\"blood-pressure\"]\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.store.path, PathBuf::from("registry.db"));
        assert_eq!(config.backend().unwrap(), Some(Backend::Sqlite));
        assert_eq!(config.janitor.stale_after_days, 90);
        assert_eq!(config.resolver.timeout_secs, 10);
        assert_eq!(config.output.format, OutputFormat::Table);

        let categories = config.category_map();
        let claim = ClaimId::parse("blood-pressure→stroke").unwrap();
        assert_eq!(categories.category_of(&claim), "heart");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_unknown_backend_is_an_error() {
        let mut config = Config::default();
        config.store.backend = Some("postgres".to_string());
        assert!(matches!(config.backend(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.resolver.rate_limit_ms = 250;
        config.save_to(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.resolver.rate_limit_ms, 250);
        assert_eq!(loaded.validation().rate_limit_ms, 250);
    }
}
