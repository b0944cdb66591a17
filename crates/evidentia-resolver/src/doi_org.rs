//! doi.org content-negotiation resolver
//!
//! Requests `application/vnd.citationstyles.csl+json` for a DOI and reads the
//! title, authors, container title and issued year out of the CSL item.
//!
//! # Examples
//!
//! ```no_run
//! use evidentia_domain::DoiResolver;
//! use evidentia_resolver::DoiOrgResolver;
//!
//! let resolver = DoiOrgResolver::default_endpoint().unwrap();
//! let citation = resolver.resolve("10.1136/bjsports-2017-097608").unwrap();
//! println!("{:?}", citation.title);
//! ```

use evidentia_domain::{DoiResolver, ResolveError, ResolvedCitation};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Default resolution service
pub const DEFAULT_BASE_URL: &str = "https://doi.org";

/// Default timeout per request (10 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default user agent; doi.org asks clients to identify themselves
pub const DEFAULT_USER_AGENT: &str = concat!("evidentia/", env!("CARGO_PKG_VERSION"));

/// Default number of attempts per DOI
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Default wait before the first retry; it doubles for each later one
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(1000);

const CSL_JSON: &str = "application/vnd.citationstyles.csl+json";

/// Resolves DOIs against doi.org (or a compatible endpoint)
#[derive(Debug, Clone)]
pub struct DoiOrgResolver {
    base_url: String,
    client: reqwest::blocking::Client,
    max_retries: u32,
    retry_backoff: Duration,
}

impl DoiOrgResolver {
    /// Create a resolver for `base_url`
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Network`] if the HTTP client cannot be built
    /// (for example when no TLS backend is available).
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ResolveError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ResolveError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        })
    }

    /// Resolver for `https://doi.org` with default timeout and user agent
    pub fn default_endpoint() -> Result<Self, ResolveError> {
        Self::new(
            DEFAULT_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            DEFAULT_USER_AGENT,
        )
    }

    /// Set the number of attempts for transport failures and 5xx responses
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the wait before the first retry
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    fn attempt(&self, url: &str) -> Result<ResolvedCitation, ResolveError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, CSL_JSON)
            .send()
            .map_err(|e| ResolveError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ResolveError::NotFound);
        }
        if !status.is_success() {
            return Err(ResolveError::Http(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| ResolveError::Network(e.to_string()))?;
        parse_csl(&body)
    }
}

impl DoiResolver for DoiOrgResolver {
    fn resolve(&self, doi: &str) -> Result<ResolvedCitation, ResolveError> {
        let url = format!("{}/{}", self.base_url, doi.trim());
        with_retries(self.max_retries, self.retry_backoff, || self.attempt(&url))
    }
}

/// Run `lookup` up to `max_attempts` times
///
/// Only transport failures and 5xx responses are retried. The wait starts
/// at `backoff` and doubles after every failed attempt.
fn with_retries<F>(
    max_attempts: u32,
    backoff: Duration,
    mut lookup: F,
) -> Result<ResolvedCitation, ResolveError>
where
    F: FnMut() -> Result<ResolvedCitation, ResolveError>,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        match lookup() {
            Err(e @ (ResolveError::Network(_) | ResolveError::Http(500..=599)))
                if attempts < max_attempts =>
            {
                debug!(attempts, error = %e, "retrying DOI lookup");
                std::thread::sleep(backoff.saturating_mul(1u32 << (attempts - 1).min(16)));
            }
            result => return result,
        }
    }
}

/// One CSL-JSON item, only the fields we read
#[derive(Deserialize)]
struct CslItem {
    #[serde(default)]
    title: Option<TextOrList>,
    #[serde(default)]
    author: Vec<CslName>,
    #[serde(default, rename = "container-title")]
    container_title: Option<TextOrList>,
    #[serde(default)]
    issued: Option<CslDate>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    fn first(self) -> Option<String> {
        let text = match self {
            TextOrList::Text(s) => Some(s),
            TextOrList::List(list) => list.into_iter().next(),
        };
        text.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
    }
}

#[derive(Deserialize)]
struct CslName {
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    given: Option<String>,
    #[serde(default)]
    literal: Option<String>,
}

impl CslName {
    fn display(&self) -> Option<String> {
        if let Some(literal) = &self.literal {
            return Some(literal.trim().to_string());
        }
        let name = format!(
            "{} {}",
            self.family.as_deref().unwrap_or(""),
            self.given.as_deref().unwrap_or("")
        );
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

#[derive(Deserialize)]
struct CslDate {
    #[serde(default, rename = "date-parts")]
    date_parts: Vec<Vec<serde_json::Value>>,
}

/// Decode a CSL-JSON body into a citation
pub fn parse_csl(body: &str) -> Result<ResolvedCitation, ResolveError> {
    let item: CslItem =
        serde_json::from_str(body).map_err(|e| ResolveError::Malformed(e.to_string()))?;

    let year = item
        .issued
        .and_then(|d| d.date_parts.into_iter().next())
        .and_then(|parts| parts.into_iter().next())
        .and_then(|y| y.as_i64().or_else(|| y.as_str().and_then(|s| s.parse().ok())))
        .and_then(|y| i32::try_from(y).ok());

    Ok(ResolvedCitation {
        title: item.title.and_then(TextOrList::first),
        authors: item.author.iter().filter_map(CslName::display).collect(),
        journal: item.container_title.and_then(TextOrList::first),
        year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_creation() {
        let resolver = DoiOrgResolver::new("https://doi.org/", Duration::from_secs(5), "test")
            .unwrap()
            .with_max_retries(3)
            .with_retry_backoff(Duration::from_millis(250));
        assert_eq!(resolver.base_url, "https://doi.org");
        assert_eq!(resolver.max_retries, 3);
        assert_eq!(resolver.retry_backoff, Duration::from_millis(250));
    }

    #[test]
    fn test_retries_transient_failures_only() {
        let mut calls = 0;
        let result = with_retries(3, Duration::ZERO, || {
            calls += 1;
            match calls {
                1 => Err(ResolveError::Network("reset".to_string())),
                2 => Err(ResolveError::Http(503)),
                _ => Ok(ResolvedCitation::default()),
            }
        });
        assert_eq!(result, Ok(ResolvedCitation::default()));
        assert_eq!(calls, 3);

        let mut calls = 0;
        let result = with_retries(3, Duration::ZERO, || {
            calls += 1;
            Err(ResolveError::NotFound)
        });
        assert_eq!(result, Err(ResolveError::NotFound));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retries_stop_at_the_limit() {
        let mut calls = 0;
        let result = with_retries(2, Duration::ZERO, || {
            calls += 1;
            Err(ResolveError::Http(502))
        });
        assert_eq!(result, Err(ResolveError::Http(502)));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_parse_csl_full_item() {
        let body = r#"{
            "title": "Protein intake and mortality risk",
            "author": [
                {"family": "Morton", "given": "Robert W."},
                {"family": "Phillips", "given": "Stuart M."}
            ],
            "container-title": ["British Journal of Sports Medicine"],
            "issued": {"date-parts": [[2018, 3]]}
        }"#;
        let citation = parse_csl(body).unwrap();
        assert_eq!(citation.title.as_deref(), Some("Protein intake and mortality risk"));
        assert_eq!(citation.authors, ["Morton Robert W.", "Phillips Stuart M."]);
        assert_eq!(citation.journal.as_deref(), Some("British Journal of Sports Medicine"));
        assert_eq!(citation.year, Some(2018));
    }

    #[test]
    fn test_parse_csl_title_list_and_missing_fields() {
        let citation = parse_csl(r#"{"title": ["First", "Second"]}"#).unwrap();
        assert_eq!(citation.title.as_deref(), Some("First"));
        assert!(citation.authors.is_empty());
        assert_eq!(citation.year, None);

        let citation = parse_csl(r#"{"title": [], "author": [{"literal": "WHO"}]}"#).unwrap();
        assert_eq!(citation.title, None);
        assert_eq!(citation.authors, ["WHO"]);
    }

    #[test]
    fn test_parse_csl_rejects_non_json() {
        assert!(matches!(
            parse_csl("<html>Not found</html>"),
            Err(ResolveError::Malformed(_))
        ));
    }

    #[test]
    fn test_unreachable_endpoint_is_network_error() {
        // Port 1 is reserved; nothing listens there
        let resolver =
            DoiOrgResolver::new("http://127.0.0.1:1", Duration::from_secs(2), "test").unwrap();
        match resolver.resolve("10.1000/xyz") {
            Err(ResolveError::Network(_)) => {} // Expected
            other => panic!("Expected network error, got {:?}", other),
        }
    }
}
