//! Verify-dois command implementation.

use crate::cli::CategoryArgs;
use crate::commands::{load_existing, Context};
use crate::error::{CliError, Result};
use evidentia_domain::{DoiResolver, Snapshot, Study, StudyId};
use evidentia_gatekeeper::{AuditOutcome, AuditReport, DoiValidator};
use evidentia_store::RegistryStore;
use std::collections::HashSet;

/// Execute the verify-dois command.
///
/// Every study (or every study linked to a claim in `--category`) is
/// resolved in turn; failures are tallied, never fatal.
pub fn execute_verify_dois<R: DoiResolver>(
    args: CategoryArgs,
    store: &RegistryStore,
    resolver: R,
    ctx: &Context<'_>,
) -> Result<AuditReport> {
    let snapshot = load_existing(store)?;
    let studies = select_studies(&snapshot, args.category.as_deref(), ctx)?;
    let formatter = ctx.formatter;
    let total = studies.len();
    let quiet = formatter.is_json();

    let validator = DoiValidator::new(resolver, ctx.config.validation());
    let mut done = 0;
    let report = validator.audit(studies, |study, outcome| {
        done += 1;
        if quiet {
            return;
        }
        let status = match outcome {
            AuditOutcome::Verified { .. } => formatter.success("verified"),
            AuditOutcome::NoDoi => formatter.warning("no DOI"),
            AuditOutcome::Failed(e) => formatter.error(&e.to_string()),
            AuditOutcome::Mismatched { .. } => formatter.warning("title mismatch"),
        };
        println!("[{}/{}] {}: {}", done, total, study.study_id, status);
    });

    if quiet {
        let failed: Vec<_> = report
            .failed
            .iter()
            .map(|(id, e)| serde_json::json!({"studyId": id, "error": e.to_string()}))
            .collect();
        let mismatched: Vec<_> = report
            .mismatched
            .iter()
            .map(|(id, expected, resolved)| {
                serde_json::json!({"studyId": id, "expected": expected, "resolved": resolved})
            })
            .collect();
        let value = serde_json::json!({
            "verified": report.verified.len(),
            "noDoi": report.no_doi.len(),
            "failed": failed,
            "mismatched": mismatched,
        });
        println!("{}", formatter.json(&value)?);
        return Ok(report);
    }

    println!();
    println!(
        "{}",
        formatter.heading(&format!(
            "{} checked: {} verified, {} without DOI, {} failed, {} mismatched",
            report.total(),
            report.verified.len(),
            report.no_doi.len(),
            report.failed.len(),
            report.mismatched.len()
        ))
    );
    for (id, error) in &report.failed {
        println!("  {} {}", formatter.error(id.as_str()), error);
    }
    for (id, expected, resolved) in &report.mismatched {
        println!(
            "  {} expected \"{}\", resolved \"{}\"",
            formatter.warning(id.as_str()),
            expected,
            resolved
        );
    }
    Ok(report)
}

fn select_studies<'a>(
    snapshot: &'a Snapshot,
    category: Option<&str>,
    ctx: &Context<'_>,
) -> Result<Vec<&'a Study>> {
    let Some(category) = category else {
        return Ok(snapshot.studies.iter().collect());
    };

    let categories = ctx.config.category_map();
    let linked: HashSet<&StudyId> = snapshot
        .study_claims
        .iter()
        .filter(|l| categories.contains(category, &l.claim_id))
        .map(|l| &l.study_id)
        .collect();
    if linked.is_empty() {
        return Err(CliError::NotFound(format!(
            "no studies in category '{}'",
            category
        )));
    }

    Ok(snapshot
        .studies
        .iter()
        .filter(|s| linked.contains(&s.study_id))
        .collect())
}
