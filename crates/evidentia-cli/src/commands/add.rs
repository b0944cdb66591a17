//! Add command implementation.
//!
//! The DOI is checked before anything else is asked, so a study with a
//! dead DOI never gets as far as scoring.

use crate::commands::{load_existing, parse_claim, Context};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::prompt::Prompt;
use evidentia_domain::{
    normalize_doi, ClaimId, Direction, DoiResolver, Repository, Score, Snapshot, Study, StudyId,
    StudyType,
};
use evidentia_gatekeeper::{DoiValidation, DoiValidator, GateDecision};
use evidentia_store::RegistryStore;
use tracing::info;

/// Everything the operator typed in for a new study.
#[derive(Debug, Clone, Default)]
pub struct StudyDraft {
    /// Author line, e.g. `Morton et al.`
    pub authors: String,
    /// Publication year
    pub year: i32,
    /// DOI as typed; normalized once the gate accepts it
    pub doi: Option<String>,
    /// Title; filled from the DOI record when left blank
    pub title: Option<String>,
    /// Journal name
    pub journal: Option<String>,
    /// Study type abbreviation (`MA`, `RCT`, ...)
    pub study_type: Option<String>,
    /// Sample size as reported
    pub sample_size: Option<String>,
    /// Quality score on the 0-14 scale
    pub quality: f64,
    /// Relevance multiplier: 1, 0.5 or 0
    pub relevance: f64,
    /// Landmark study flag
    pub landmark: bool,
    /// Direction of the evidence; supporting when absent
    pub direction: Option<Direction>,
    /// Population; `all` when blank
    pub population: Option<String>,
    /// One-line key finding
    pub key_finding: Option<String>,
    /// Claim ids to link, `->` accepted for `→`
    pub claims: Vec<String>,
}

impl StudyDraft {
    /// Build the study and the claims it should be linked to.
    pub fn build(self, today: chrono::NaiveDate) -> Result<(Study, Vec<ClaimId>)> {
        let authors = self.authors.trim().to_string();
        if authors.is_empty() {
            return Err(CliError::InvalidInput("Authors are required".to_string()));
        }
        let score = Score::from_parts(self.quality, self.relevance)?;
        let claims = self
            .claims
            .iter()
            .map(|c| parse_claim(c))
            .collect::<Result<Vec<_>>>()?;

        let mut study = Study::new(
            StudyId::generate(&authors, self.year),
            authors,
            self.year,
            score,
            self.direction.unwrap_or(Direction::Supports),
        );
        if let Some(doi) = self.doi.as_deref() {
            study = study.with_doi(doi);
        }
        study.title = self.title;
        study.journal = self.journal;
        study.study_type = self.study_type.as_deref().map(StudyType::parse);
        study.sample_size = self.sample_size;
        study.landmark = self.landmark;
        if let Some(population) = self.population.filter(|p| !p.trim().is_empty()) {
            study.population = population;
        }
        study.key_finding = self.key_finding;
        study.verified_date = Some(today.format("%Y-%m").to_string());
        study.added_date = Some(today.format("%Y-%m-%d").to_string());

        Ok((study, claims))
    }
}

/// Run the creation gate on the draft's DOI.
///
/// `confirm` is asked whether to go ahead when the DOI resolves to another
/// title. A resolved title fills in a missing one. Returns `false` when the
/// operator declined.
pub fn check_doi<R, F>(
    validator: &DoiValidator<R>,
    draft: &mut StudyDraft,
    confirm: F,
) -> Result<bool>
where
    R: DoiResolver,
    F: FnOnce(&DoiValidation) -> Result<bool>,
{
    match validator.gate(draft.doi.as_deref(), draft.title.as_deref()) {
        GateDecision::Unchecked => Ok(true),
        GateDecision::Rejected(failure) => Err(CliError::Validation(failure)),
        GateDecision::NeedsConfirmation(validation) => confirm(&validation),
        GateDecision::Accepted {
            validation,
            auto_title,
        } => {
            draft.doi = Some(validation.doi);
            if auto_title.is_some() {
                draft.title = auto_title;
            }
            Ok(true)
        }
    }
}

/// Insert the study and link it to its claims, creating unknown claims.
pub fn register(snapshot: &mut Snapshot, study: Study, claims: &[ClaimId]) -> Result<StudyId> {
    let id = study.study_id.clone();
    snapshot.insert_study(study)?;
    for claim in claims {
        snapshot.ensure_claim(claim.clone(), None);
        snapshot.link(&id, claim, None)?;
    }
    Ok(id)
}

/// Execute the add command.
pub fn execute_add<R: DoiResolver>(
    store: &mut RegistryStore,
    resolver: R,
    ctx: &Context<'_>,
) -> Result<()> {
    let mut snapshot = load_existing(store)?;
    let formatter = ctx.formatter;
    let validator = DoiValidator::new(resolver, ctx.config.validation());
    let mut prompt = Prompt::new()?;

    let mut draft = StudyDraft {
        authors: prompt.ask_required("Authors (e.g. Morton et al.)")?,
        year: ask_number(&mut prompt, "Publication year", formatter)?,
        doi: prompt.ask_optional("DOI")?,
        title: prompt.ask_optional("Title (blank to take it from the DOI)")?,
        ..StudyDraft::default()
    };

    if let Some(doi) = draft.doi.as_deref().and_then(normalize_doi) {
        if let Some(existing) = snapshot.study_by_doi(&doi) {
            return Err(CliError::InvalidInput(format!(
                "DOI already registered as {}",
                existing.study_id
            )));
        }
    }

    let proceed = check_doi(&validator, &mut draft, |validation| {
        println!(
            "{}",
            formatter.warning(&format!(
                "DOI resolves to \"{}\"",
                validation.resolved_title()
            ))
        );
        prompt.confirm("Add anyway?")
    })?;
    if !proceed {
        println!("{}", formatter.info("Study not added"));
        return Ok(());
    }
    if let Some(title) = draft.title.as_deref() {
        println!("{}", formatter.info(&format!("Title: {}", title)));
    }

    draft.journal = prompt.ask_optional("Journal")?;
    draft.study_type = prompt.ask_optional("Study type (MA, SR, RCT, Cohort, ...)")?;
    draft.sample_size = prompt.ask_optional("Sample size")?;
    draft.quality = ask_number(&mut prompt, "Quality score (0-14)", formatter)?;
    draft.relevance = ask_number(&mut prompt, "Relevance (1, 0.5, 0)", formatter)?;
    draft.landmark = prompt.confirm("Landmark study?")?;
    draft.direction = loop {
        let raw = prompt.ask("Direction (+, -, ±)")?;
        match Direction::parse(&raw) {
            Some(direction) => break Some(direction),
            None => println!("{}", formatter.error("Enter +, - or ±")),
        }
    };
    draft.population = prompt.ask_optional("Population (blank for all)")?;
    draft.key_finding = prompt.ask_optional("Key finding")?;
    draft.claims = prompt
        .ask("Claims (comma-separated, e.g. protein→muscle)")?
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect();

    let (study, claims) = draft.build(ctx.today)?;
    let id = register(&mut snapshot, study, &claims)?;
    store.save(&snapshot)?;

    info!(study = %id, claims = claims.len(), "study added");
    println!("{}", formatter.success(&format!("Added {}", id)));
    Ok(())
}

fn ask_number<T: std::str::FromStr>(
    prompt: &mut Prompt,
    label: &str,
    formatter: &Formatter,
) -> Result<T> {
    loop {
        let raw = prompt.ask(label)?;
        match raw.parse() {
            Ok(value) => return Ok(value),
            Err(_) => println!("{}", formatter.error(&format!("'{}' is not a number", raw))),
        }
    }
}
