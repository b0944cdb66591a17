//! Study module - a single research publication and its scoring

use crate::{Direction, DomainError};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Prefixes stripped from operator-supplied DOIs
const DOI_PREFIXES: [&str; 5] = [
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi:",
];

/// Trim a DOI and strip any resolver URL prefix
///
/// Returns `None` for blank input.
///
/// # Examples
///
/// ```
/// use evidentia_domain::normalize_doi;
///
/// assert_eq!(normalize_doi(" https://doi.org/10.1000/xyz "), Some("10.1000/xyz".to_string()));
/// assert_eq!(normalize_doi("   "), None);
/// ```
pub fn normalize_doi(raw: &str) -> Option<String> {
    let mut doi = raw.trim();
    for prefix in DOI_PREFIXES {
        if let Some(rest) = doi.strip_prefix(prefix) {
            doi = rest.trim();
            break;
        }
    }
    (!doi.is_empty()).then(|| doi.to_string())
}

/// Unique identifier of a study: `<surname>-<year>-<random suffix>`
///
/// The suffix is random so ids are neither guessable nor meaningful beyond
/// a hint of who wrote the study and when.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudyId(String);

impl StudyId {
    /// Generate a fresh id from the first author's surname and the year
    ///
    /// # Examples
    ///
    /// ```
    /// use evidentia_domain::StudyId;
    ///
    /// let id = StudyId::generate("**Morton** et al.", 2018);
    /// assert!(id.as_str().starts_with("morton-2018-"));
    /// assert_eq!(id.as_str().len(), "morton-2018-".len() + 4);
    /// ```
    pub fn generate(authors: &str, year: i32) -> Self {
        let first = authors
            .trim()
            .trim_matches('*')
            .split_whitespace()
            .next()
            .unwrap_or("")
            .split('&')
            .next()
            .unwrap_or("");
        let mut surname: String = first
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if surname.is_empty() {
            surname.push_str("study");
        }

        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}-{}", surname, year, &suffix[..4]))
    }

    /// Wrap an existing id (storage layer and operator input)
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Design of a study, which drives citation badge styling downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StudyType {
    /// Meta-analysis of multiple studies
    MetaAnalysis,
    /// Systematic review
    SystematicReview,
    /// Randomized (controlled) trial
    RandomizedTrial,
    /// Prospective or retrospective cohort
    Cohort,
    /// Validation study of an instrument or estimator
    Validation,
    /// Anything else (cross-sectional, case-control, ...)
    Other,
}

impl StudyType {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            StudyType::MetaAnalysis => "Meta-analysis",
            StudyType::SystematicReview => "Systematic review",
            StudyType::RandomizedTrial => "RCT",
            StudyType::Cohort => "Cohort",
            StudyType::Validation => "Validation",
            StudyType::Other => "Other",
        }
    }

    /// Stable slug, used as the citation badge category
    pub fn slug(&self) -> &'static str {
        match self {
            StudyType::MetaAnalysis => "meta-analysis",
            StudyType::SystematicReview => "systematic-review",
            StudyType::RandomizedTrial => "rct",
            StudyType::Cohort => "cohort",
            StudyType::Validation => "validation",
            StudyType::Other => "study",
        }
    }

    /// Lenient parse from labels and the abbreviations used in registry tables
    ///
    /// Unrecognized designs map to [`StudyType::Other`].
    pub fn parse(s: &str) -> Self {
        let lower = s.trim().to_lowercase();
        if lower.contains("meta") || lower == "ma" || lower.starts_with("ma ") || lower.starts_with("ma+") {
            StudyType::MetaAnalysis
        } else if lower.contains("systematic") || lower == "sr" || lower.contains("umbrella") {
            StudyType::SystematicReview
        } else if lower.contains("rct") || lower.contains("random") {
            StudyType::RandomizedTrial
        } else if lower.contains("cohort") {
            StudyType::Cohort
        } else if lower.contains("validation") {
            StudyType::Validation
        } else {
            StudyType::Other
        }
    }
}

impl fmt::Display for StudyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for StudyType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<StudyType> for String {
    fn from(study_type: StudyType) -> Self {
        study_type.label().to_string()
    }
}

/// Lifecycle status of a study
///
/// Studies are never physically deleted; retirement is a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyStatus {
    /// In use
    #[default]
    Active,
    /// Replaced by a newer study (`superseded_by` is set)
    Superseded,
    /// Withdrawn from the evidence base
    Retracted,
}

impl StudyStatus {
    /// Status name as persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyStatus::Active => "active",
            StudyStatus::Superseded => "superseded",
            StudyStatus::Retracted => "retracted",
        }
    }

    /// Parse a persisted status name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" | "" => Some(StudyStatus::Active),
            "superseded" => Some(StudyStatus::Superseded),
            "retracted" => Some(StudyStatus::Retracted),
            _ => None,
        }
    }
}

/// How relevant a study is to the registry's population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relevance {
    /// Not applicable (multiplier 0)
    None,
    /// Partially applicable (multiplier 0.5)
    Half,
    /// Fully applicable (multiplier 1.0)
    Full,
}

impl Relevance {
    /// Numeric multiplier
    pub fn multiplier(&self) -> f64 {
        match self {
            Relevance::None => 0.0,
            Relevance::Half => 0.5,
            Relevance::Full => 1.0,
        }
    }

    /// Map a multiplier back to a relevance level
    pub fn from_multiplier(value: f64) -> Option<Self> {
        if value == 0.0 {
            Some(Relevance::None)
        } else if value == 0.5 {
            Some(Relevance::Half)
        } else if value == 1.0 {
            Some(Relevance::Full)
        } else {
            None
        }
    }
}

/// Quality and relevance of a study; the final score is always derived
///
/// The final score cannot be set directly:
/// `final_score() == quality() * relevance().multiplier()` holds for every
/// value of this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    quality: f64,
    relevance: Relevance,
}

impl Score {
    /// Upper bound of the quality scale
    pub const MAX_QUALITY: f64 = 14.0;

    /// Create a score, validating the quality range
    pub fn new(quality: f64, relevance: Relevance) -> Result<Self, DomainError> {
        if !quality.is_finite() || !(0.0..=Self::MAX_QUALITY).contains(&quality) {
            return Err(DomainError::Invalid(format!(
                "quality score {} is outside 0-{}",
                quality,
                Self::MAX_QUALITY
            )));
        }
        Ok(Self { quality, relevance })
    }

    /// Create a score from a raw relevance multiplier
    pub fn from_parts(quality: f64, relevance_mult: f64) -> Result<Self, DomainError> {
        let relevance = Relevance::from_multiplier(relevance_mult).ok_or_else(|| {
            DomainError::Invalid(format!(
                "relevance multiplier {} must be one of 0, 0.5, 1.0",
                relevance_mult
            ))
        })?;
        Self::new(quality, relevance)
    }

    /// A zero score with full relevance (unscored imports)
    pub fn unscored() -> Self {
        Self {
            quality: 0.0,
            relevance: Relevance::Full,
        }
    }

    /// Quality on the 0-14 scale
    pub fn quality(&self) -> f64 {
        self.quality
    }

    /// Relevance level
    pub fn relevance(&self) -> Relevance {
        self.relevance
    }

    /// `quality × relevance`
    pub fn final_score(&self) -> f64 {
        self.quality * self.relevance.multiplier()
    }
}

/// A reported effect estimate
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EffectSize {
    /// Metric name (HR, RR, OR, SMD, ...)
    #[serde(default)]
    pub metric: String,
    /// Point estimate
    #[serde(default)]
    pub value: Option<f64>,
    /// Lower confidence bound
    #[serde(default)]
    pub ci_lower: Option<f64>,
    /// Upper confidence bound
    #[serde(default)]
    pub ci_upper: Option<f64>,
    /// What was compared
    #[serde(default)]
    pub comparison: Option<String>,
}

/// A research publication or source in the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StudyRecord", into = "StudyRecord")]
pub struct Study {
    /// Unique identifier
    pub study_id: StudyId,
    /// Author line as cited
    pub authors: String,
    /// Publication year
    pub pub_year: i32,
    /// Publication title
    pub title: Option<String>,
    /// Journal or venue
    pub journal: Option<String>,
    /// DOI without resolver prefix; globally unique when present
    pub doi: Option<String>,
    /// Study design
    pub study_type: Option<StudyType>,
    /// Sample size as reported (free text)
    pub sample_size: Option<String>,
    score: Score,
    /// Field-defining study regardless of score
    pub landmark: bool,
    /// The study's own direction; links may override it per claim
    pub direction: Direction,
    /// Population scope qualifier
    pub population: String,
    /// One-line summary of the finding
    pub key_finding: Option<String>,
    /// Reported effect estimates
    pub effect_sizes: Vec<EffectSize>,
    /// Last verification, `YYYY-MM`
    pub verified_date: Option<String>,
    /// Date the study entered the registry, `YYYY-MM-DD`
    pub added_date: Option<String>,
    /// Lifecycle status
    pub status: StudyStatus,
    /// Replacement study when superseded
    pub superseded_by: Option<StudyId>,
    /// Free-form notes
    pub notes: Option<String>,
}

impl Study {
    /// Create an active study with default optional fields
    pub fn new(
        study_id: StudyId,
        authors: impl Into<String>,
        pub_year: i32,
        score: Score,
        direction: Direction,
    ) -> Self {
        Self {
            study_id,
            authors: authors.into(),
            pub_year,
            title: None,
            journal: None,
            doi: None,
            study_type: None,
            sample_size: None,
            score,
            landmark: false,
            direction,
            population: "all".to_string(),
            key_finding: None,
            effect_sizes: Vec::new(),
            verified_date: None,
            added_date: None,
            status: StudyStatus::Active,
            superseded_by: None,
            notes: None,
        }
    }

    /// Set the DOI, normalizing away any resolver prefix
    pub fn with_doi(mut self, doi: &str) -> Self {
        self.doi = normalize_doi(doi);
        self
    }

    /// Current score
    pub fn score(&self) -> Score {
        self.score
    }

    /// Replace the score; the final score follows automatically
    pub fn set_score(&mut self, score: Score) {
        self.score = score;
    }

    /// Quality on the 0-14 scale
    pub fn quality_score(&self) -> f64 {
        self.score.quality()
    }

    /// Relevance multiplier
    pub fn relevance_mult(&self) -> f64 {
        self.score.relevance().multiplier()
    }

    /// Derived ranking value
    pub fn final_score(&self) -> f64 {
        self.score.final_score()
    }

    /// Whether the study is still in active use
    pub fn is_active(&self) -> bool {
        self.status == StudyStatus::Active
    }

    /// `"<authors> <year> (<rounded score>)"`, the form used in summaries
    pub fn short_label(&self) -> String {
        format!(
            "{} {} ({:.0})",
            self.authors,
            self.pub_year,
            self.final_score()
        )
    }
}

/// Accepts sample sizes persisted either as text or as a bare number
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        Some(TextOrNumber::Text(s)) if s.trim().is_empty() => None,
        Some(TextOrNumber::Text(s)) => Some(s),
        Some(TextOrNumber::Int(n)) => Some(n.to_string()),
        Some(TextOrNumber::Float(n)) => Some(n.to_string()),
        None => None,
    })
}

fn default_population() -> String {
    "all".to_string()
}

fn default_relevance() -> f64 {
    1.0
}

/// Persisted flat layout of a study
///
/// `final_score` is written for readers of the raw document and ignored on
/// load; the loaded study recomputes it from quality and relevance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyRecord {
    /// See [`Study::study_id`]
    pub study_id: StudyId,
    /// See [`Study::authors`]
    pub authors: String,
    /// See [`Study::pub_year`]
    pub pub_year: i32,
    /// See [`Study::title`]
    #[serde(default)]
    pub title: Option<String>,
    /// See [`Study::journal`]
    #[serde(default)]
    pub journal: Option<String>,
    /// See [`Study::doi`]
    #[serde(default)]
    pub doi: Option<String>,
    /// See [`Study::study_type`]
    #[serde(default)]
    pub study_type: Option<String>,
    /// See [`Study::sample_size`]
    #[serde(default, deserialize_with = "text_or_number")]
    pub sample_size: Option<String>,
    /// Quality on the 0-14 scale
    #[serde(default)]
    pub quality_score: f64,
    /// Relevance multiplier
    #[serde(default = "default_relevance", alias = "relevance")]
    pub relevance_mult: f64,
    /// Derived; ignored on load
    #[serde(default)]
    pub final_score: f64,
    /// See [`Study::landmark`]
    #[serde(default, alias = "is_landmark")]
    pub landmark: bool,
    /// See [`Study::direction`]
    pub direction: Direction,
    /// See [`Study::population`]
    #[serde(default = "default_population")]
    pub population: String,
    /// See [`Study::key_finding`]
    #[serde(default)]
    pub key_finding: Option<String>,
    /// See [`Study::effect_sizes`]
    #[serde(default)]
    pub effect_sizes: Vec<EffectSize>,
    /// See [`Study::verified_date`]
    #[serde(default)]
    pub verified_date: Option<String>,
    /// See [`Study::added_date`]
    #[serde(default)]
    pub added_date: Option<String>,
    /// See [`Study::status`]
    #[serde(default)]
    pub status: StudyStatus,
    /// See [`Study::superseded_by`]
    #[serde(default)]
    pub superseded_by: Option<StudyId>,
    /// See [`Study::notes`]
    #[serde(default)]
    pub notes: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<StudyRecord> for Study {
    type Error = DomainError;

    fn try_from(record: StudyRecord) -> Result<Self, Self::Error> {
        let score = Score::from_parts(record.quality_score, record.relevance_mult).map_err(|e| {
            DomainError::Invalid(format!("study {}: {}", record.study_id, e))
        })?;

        Ok(Study {
            study_id: record.study_id,
            authors: record.authors,
            pub_year: record.pub_year,
            title: non_blank(record.title),
            journal: non_blank(record.journal),
            doi: record.doi.as_deref().and_then(normalize_doi),
            study_type: non_blank(record.study_type).map(|t| StudyType::parse(&t)),
            sample_size: record.sample_size,
            score,
            landmark: record.landmark,
            direction: record.direction,
            population: if record.population.trim().is_empty() {
                default_population()
            } else {
                record.population
            },
            key_finding: non_blank(record.key_finding),
            effect_sizes: record.effect_sizes,
            verified_date: non_blank(record.verified_date),
            added_date: non_blank(record.added_date),
            status: record.status,
            superseded_by: record.superseded_by,
            notes: non_blank(record.notes),
        })
    }
}

impl From<Study> for StudyRecord {
    fn from(study: Study) -> Self {
        StudyRecord {
            quality_score: study.quality_score(),
            relevance_mult: study.relevance_mult(),
            final_score: study.final_score(),
            study_id: study.study_id,
            authors: study.authors,
            pub_year: study.pub_year,
            title: study.title,
            journal: study.journal,
            doi: study.doi,
            study_type: study.study_type.map(String::from),
            sample_size: study.sample_size,
            landmark: study.landmark,
            direction: study.direction,
            population: study.population,
            key_finding: study.key_finding,
            effect_sizes: study.effect_sizes,
            verified_date: study.verified_date,
            added_date: study.added_date,
            status: study.status,
            superseded_by: study.superseded_by,
            notes: study.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn study() -> Study {
        Study::new(
            StudyId::new("morton-2018-ab12"),
            "Morton et al.",
            2018,
            Score::new(12.0, Relevance::Full).unwrap(),
            Direction::Supports,
        )
    }

    #[test]
    fn test_final_score_follows_score_changes() {
        let mut s = study();
        assert_eq!(s.final_score(), 12.0);

        s.set_score(Score::new(12.0, Relevance::Half).unwrap());
        assert_eq!(s.final_score(), 6.0);
        assert_eq!(s.relevance_mult(), 0.5);
    }

    #[test]
    fn test_score_rejects_out_of_range_quality() {
        assert!(Score::new(14.5, Relevance::Full).is_err());
        assert!(Score::new(-1.0, Relevance::Full).is_err());
        assert!(Score::new(f64::NAN, Relevance::Full).is_err());
        assert!(Score::from_parts(10.0, 0.7).is_err());
    }

    #[test]
    fn test_study_id_generation() {
        let a = StudyId::generate("Smith & Jones", 2020);
        let b = StudyId::generate("Smith & Jones", 2020);
        assert!(a.as_str().starts_with("smith-2020-"));
        assert_ne!(a, b, "random suffix should differ");

        let anon = StudyId::generate("  ", 1999);
        assert!(anon.as_str().starts_with("study-1999-"));
    }

    #[test]
    fn test_study_type_parse() {
        assert_eq!(StudyType::parse("MA"), StudyType::MetaAnalysis);
        assert_eq!(StudyType::parse("Meta-analysis (42 cohorts)"), StudyType::MetaAnalysis);
        assert_eq!(StudyType::parse("SR"), StudyType::SystematicReview);
        assert_eq!(StudyType::parse("RCT"), StudyType::RandomizedTrial);
        assert_eq!(StudyType::parse("Prospective cohort"), StudyType::Cohort);
        assert_eq!(StudyType::parse("Validation"), StudyType::Validation);
        assert_eq!(StudyType::parse("Cross-sectional"), StudyType::Other);
    }

    #[test]
    fn test_load_recomputes_final_score() {
        let json = r#"{
            "study_id": "lee-2020-0001",
            "authors": "Lee",
            "pub_year": 2020,
            "quality_score": 10,
            "relevance_mult": 0.5,
            "final_score": 99,
            "direction": "+",
            "sample_size": 1200,
            "doi": "https://doi.org/10.1/abc"
        }"#;
        let s: Study = serde_json::from_str(json).unwrap();
        assert_eq!(s.final_score(), 5.0);
        assert_eq!(s.sample_size.as_deref(), Some("1200"));
        assert_eq!(s.doi.as_deref(), Some("10.1/abc"));
        assert_eq!(s.population, "all");
        assert_eq!(s.status, StudyStatus::Active);
    }

    #[test]
    fn test_load_rejects_invalid_relevance() {
        let json = r#"{"study_id":"x","authors":"X","pub_year":2020,"quality_score":10,"relevance_mult":0.3,"direction":"+"}"#;
        assert!(serde_json::from_str::<Study>(json).is_err());
    }

    #[test]
    fn test_short_label_rounds_score() {
        let mut s = study();
        s.set_score(Score::new(11.5, Relevance::Full).unwrap());
        assert_eq!(s.short_label(), "Morton et al. 2018 (12)");
    }
}
