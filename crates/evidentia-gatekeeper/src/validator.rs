//! DOI validation and the study creation gate

use crate::{titles_match, DoiFailure, ValidationConfig};
use evidentia_domain::{normalize_doi, DoiResolver, ResolvedCitation};
use tracing::debug;

/// Outcome of resolving one DOI
#[derive(Debug, Clone, PartialEq)]
pub struct DoiValidation {
    /// The DOI as looked up (prefix stripped)
    pub doi: String,

    /// Whether the DOI resolved to a publication
    pub valid: bool,

    /// `None` when no expected title was supplied
    pub title_match: Option<bool>,

    /// Metadata from the resolver, when valid
    pub resolved: Option<ResolvedCitation>,

    /// Why validation failed, when it did
    pub error: Option<DoiFailure>,
}

impl DoiValidation {
    fn failed(doi: String, error: DoiFailure) -> Self {
        Self {
            doi,
            valid: false,
            title_match: None,
            resolved: None,
            error: Some(error),
        }
    }

    /// Resolved title, or `""`
    pub fn resolved_title(&self) -> &str {
        self.resolved
            .as_ref()
            .and_then(|c| c.title.as_deref())
            .unwrap_or("")
    }

    /// First resolved author, or `""`
    pub fn resolved_authors(&self) -> &str {
        self.resolved
            .as_ref()
            .and_then(|c| c.authors.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Valid and not contradicted by the title check
    pub fn is_verified(&self) -> bool {
        self.valid && self.title_match != Some(false)
    }
}

/// What the creation gate decided about a new study
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Study has no DOI and none is required; nothing was checked
    Unchecked,

    /// Do not create the study
    Rejected(DoiFailure),

    /// DOI resolves but to a different title; ask the operator
    NeedsConfirmation(DoiValidation),

    /// DOI verified
    Accepted {
        /// Full validation result
        validation: DoiValidation,
        /// Title resolved from the DOI when the operator gave none
        auto_title: Option<String>,
    },
}

/// Validates DOIs against a resolver
pub struct DoiValidator<R> {
    resolver: R,
    config: ValidationConfig,
}

impl<R: DoiResolver> DoiValidator<R> {
    /// Create a validator with the given resolver and configuration
    pub fn new(resolver: R, config: ValidationConfig) -> Self {
        Self { resolver, config }
    }

    /// Create a validator with default configuration
    pub fn default_config(resolver: R) -> Self {
        Self::new(resolver, ValidationConfig::default())
    }

    /// Active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Resolve `doi` and, if `expected_title` is given, compare titles
    ///
    /// Never fails: every resolver problem is reported in the result.
    pub fn validate(&self, doi: &str, expected_title: Option<&str>) -> DoiValidation {
        let Some(doi) = normalize_doi(doi) else {
            return DoiValidation::failed(String::new(), DoiFailure::Missing);
        };

        let citation = match self.resolver.resolve(&doi) {
            Ok(citation) => citation,
            Err(e) => {
                let failure = DoiFailure::from_resolve(&doi, e);
                debug!(doi = %doi, error = %failure, "DOI did not resolve");
                return DoiValidation::failed(doi, failure);
            }
        };

        let expected_title = expected_title.map(str::trim).filter(|t| !t.is_empty());
        let title_match = match expected_title {
            Some(expected) if self.config.check_titles => Some(titles_match(
                expected,
                citation.title.as_deref().unwrap_or(""),
            )),
            _ => None,
        };

        DoiValidation {
            doi,
            valid: true,
            title_match,
            resolved: Some(citation),
            error: None,
        }
    }

    /// Decide whether a new study may be created
    ///
    /// Rejects unresolvable DOIs, asks for confirmation on a title mismatch,
    /// and offers the resolved title when the operator supplied none.
    pub fn gate(&self, doi: Option<&str>, title: Option<&str>) -> GateDecision {
        let doi = doi.and_then(normalize_doi);
        let Some(doi) = doi else {
            return if self.config.require_doi {
                GateDecision::Rejected(DoiFailure::Missing)
            } else {
                GateDecision::Unchecked
            };
        };

        let validation = self.validate(&doi, title);
        if !validation.valid {
            let failure = validation.error.unwrap_or(DoiFailure::Missing);
            return GateDecision::Rejected(failure);
        }
        if validation.title_match == Some(false) {
            return GateDecision::NeedsConfirmation(validation);
        }

        let has_title = title.is_some_and(|t| !t.trim().is_empty());
        let auto_title = if has_title {
            None
        } else {
            Some(validation.resolved_title().to_string()).filter(|t| !t.is_empty())
        };
        GateDecision::Accepted {
            validation,
            auto_title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidentia_domain::ResolveError;
    use evidentia_resolver::MockResolver;

    fn validator() -> (DoiValidator<MockResolver>, MockResolver) {
        let resolver = MockResolver::new();
        resolver.add_citation(
            "10.1/protein",
            ResolvedCitation {
                title: Some("Protein intake and mortality risk".to_string()),
                authors: vec!["Song Mingyang".to_string(), "Fung Teresa".to_string()],
                journal: Some("JAMA Internal Medicine".to_string()),
                year: Some(2016),
            },
        );
        resolver.add_error("10.1/down", ResolveError::Network("timed out".to_string()));
        resolver.add_error("10.1/teapot", ResolveError::Http(418));
        (
            DoiValidator::default_config(resolver.clone()),
            resolver,
        )
    }

    #[test]
    fn test_title_match_true_on_containment() {
        let (validator, _) = validator();
        let result = validator.validate(
            "https://doi.org/10.1/protein",
            Some("Protein Intake And Mortality Risk: A Cohort Study"),
        );
        assert!(result.valid);
        assert_eq!(result.title_match, Some(true));
        assert_eq!(result.doi, "10.1/protein");
        assert_eq!(result.resolved_title(), "Protein intake and mortality risk");
        assert_eq!(result.resolved_authors(), "Song Mingyang");
    }

    #[test]
    fn test_title_match_false_on_unrelated_title() {
        let (validator, _) = validator();
        let result = validator.validate("10.1/protein", Some("Sleep duration and dementia"));
        assert!(result.valid);
        assert_eq!(result.title_match, Some(false));
        assert!(!result.is_verified());
    }

    #[test]
    fn test_title_match_none_without_expected_title() {
        let (validator, _) = validator();
        assert_eq!(validator.validate("10.1/protein", None).title_match, None);
        assert_eq!(validator.validate("10.1/protein", Some("  ")).title_match, None);
    }

    #[test]
    fn test_untitled_record_passes_the_gate() {
        let (validator, resolver) = validator();
        resolver.add_citation(
            "10.1/untitled",
            ResolvedCitation {
                title: None,
                authors: vec!["Tang Jason".to_string()],
                journal: None,
                year: Some(2009),
            },
        );

        let result = validator.validate("10.1/untitled", Some("Whey, casein and soy protein"));
        assert_eq!(result.title_match, Some(true));
        assert!(result.is_verified());

        match validator.gate(Some("10.1/untitled"), Some("Whey, casein and soy protein")) {
            GateDecision::Accepted { auto_title, .. } => assert_eq!(auto_title, None),
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_modes_are_distinguished() {
        let (validator, _) = validator();

        let missing = validator.validate("10.1/unknown", None);
        assert!(!missing.valid);
        assert_eq!(missing.error, Some(DoiFailure::NotFound("10.1/unknown".to_string())));

        let http = validator.validate("10.1/teapot", None);
        assert!(matches!(http.error, Some(DoiFailure::Http { status: 418, .. })));

        let network = validator.validate("10.1/down", None);
        assert!(network.error.as_ref().is_some_and(DoiFailure::is_network));

        let blank = validator.validate("  ", None);
        assert_eq!(blank.error, Some(DoiFailure::Missing));
    }

    #[test]
    fn test_gate_rejects_invalid_doi() {
        let (validator, _) = validator();
        assert!(matches!(
            validator.gate(Some("10.1/unknown"), Some("Anything")),
            GateDecision::Rejected(DoiFailure::NotFound(_))
        ));
        assert!(matches!(
            validator.gate(Some("10.1/down"), None),
            GateDecision::Rejected(DoiFailure::Network(_))
        ));
    }

    #[test]
    fn test_gate_asks_on_mismatch() {
        let (validator, _) = validator();
        assert!(matches!(
            validator.gate(Some("10.1/protein"), Some("Completely different paper")),
            GateDecision::NeedsConfirmation(_)
        ));
    }

    #[test]
    fn test_gate_auto_fills_title() {
        let (validator, _) = validator();
        match validator.gate(Some("10.1/protein"), None) {
            GateDecision::Accepted { auto_title, .. } => {
                assert_eq!(auto_title.as_deref(), Some("Protein intake and mortality risk"));
            }
            other => panic!("Expected acceptance, got {:?}", other),
        }

        match validator.gate(Some("10.1/protein"), Some("Protein intake and mortality risk")) {
            GateDecision::Accepted { auto_title, .. } => assert!(auto_title.is_none()),
            other => panic!("Expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_gate_without_doi() {
        let (validator, resolver) = validator();
        assert_eq!(validator.gate(None, Some("Title")), GateDecision::Unchecked);
        assert_eq!(resolver.call_count(), 0);

        let strict = DoiValidator::new(MockResolver::new(), ValidationConfig::strict());
        assert_eq!(strict.gate(Some(" "), None), GateDecision::Rejected(DoiFailure::Missing));
    }

    #[test]
    fn test_permissive_config_skips_title_check() {
        let (_, resolver) = validator();
        let validator = DoiValidator::new(resolver, ValidationConfig::permissive());
        let result = validator.validate("10.1/protein", Some("Completely different"));
        assert_eq!(result.title_match, None);
    }
}
