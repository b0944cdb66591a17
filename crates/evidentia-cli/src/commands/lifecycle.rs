//! Stale, supersede, retract, reverify and enrich-all command implementations.

use crate::cli::{RetractArgs, ReverifyArgs, SupersedeArgs};
use crate::commands::{load_existing, Context};
use crate::error::{CliError, Result};
use crate::output::{format_score, or_dash};
use evidentia_domain::{Repository, StudyId};
use evidentia_janitor::Janitor;
use evidentia_store::RegistryStore;

fn janitor(ctx: &Context<'_>) -> Janitor {
    Janitor::new(ctx.config.janitor.clone())
}

/// Execute the stale command.
pub fn execute_stale(store: &RegistryStore, ctx: &Context<'_>) -> Result<()> {
    let snapshot = load_existing(store)?;
    let report = janitor(ctx).stale_report(&snapshot, ctx.today);
    let formatter = ctx.formatter;

    if formatter.is_json() {
        let rows: Vec<_> = report
            .studies
            .iter()
            .map(|s| {
                serde_json::json!({
                    "studyId": s.study_id,
                    "authors": s.authors,
                    "year": s.pub_year,
                    "verifiedDate": s.verified_date,
                    "status": s.status.as_str(),
                })
            })
            .collect();
        let value = serde_json::json!({ "cutoff": report.cutoff, "studies": rows });
        println!("{}", formatter.json(&value)?);
        return Ok(());
    }

    let rows = report.studies.iter().map(|s| {
        vec![
            s.study_id.to_string(),
            format!("{} {}", s.authors, s.pub_year),
            s.verified_date.clone().unwrap_or_else(|| "never".to_string()),
            format_score(s.final_score()),
        ]
    });
    println!(
        "{}",
        formatter.table(
            &["ID", "Study", "Verified", "Score"],
            rows,
            "No stale studies."
        )
    );
    println!(
        "{}",
        formatter.info(&format!(
            "{} studies last verified in or before {}",
            report.studies.len(),
            report.cutoff
        ))
    );
    Ok(())
}

/// Execute the supersede command.
pub fn execute_supersede(
    args: SupersedeArgs,
    store: &mut RegistryStore,
    ctx: &Context<'_>,
) -> Result<()> {
    let mut snapshot = load_existing(store)?;
    let old = StudyId::new(args.old_id.trim());
    let new = StudyId::new(args.new_id.trim());

    janitor(ctx).supersede(&mut snapshot, &old, &new, ctx.today)?;
    store.save(&snapshot)?;

    println!(
        "{}",
        ctx.formatter
            .success(&format!("{} superseded by {}", old, new))
    );
    Ok(())
}

/// Execute the retract command.
pub fn execute_retract(
    args: RetractArgs,
    store: &mut RegistryStore,
    ctx: &Context<'_>,
) -> Result<()> {
    if args.reason.trim().is_empty() {
        return Err(CliError::InvalidInput(
            "A retraction needs a reason".to_string(),
        ));
    }

    let mut snapshot = load_existing(store)?;
    let id = StudyId::new(args.study_id.trim());

    janitor(ctx).retract(&mut snapshot, &id, &args.reason, ctx.today)?;
    store.save(&snapshot)?;

    println!("{}", ctx.formatter.success(&format!("{} retracted", id)));
    Ok(())
}

/// Execute the reverify command.
pub fn execute_reverify(
    args: ReverifyArgs,
    store: &mut RegistryStore,
    ctx: &Context<'_>,
) -> Result<()> {
    let mut snapshot = load_existing(store)?;
    let id = StudyId::new(args.study_id.trim());

    janitor(ctx).reverify(&mut snapshot, &id, ctx.today)?;
    store.save(&snapshot)?;

    println!(
        "{}",
        ctx.formatter.success(&format!(
            "{} verified {}",
            id,
            ctx.today.format("%Y-%m")
        ))
    );
    Ok(())
}

/// Execute the enrich-all command.
pub fn execute_enrich_all(store: &RegistryStore, ctx: &Context<'_>) -> Result<()> {
    let snapshot = load_existing(store)?;
    let janitor = janitor(ctx);
    let entries = janitor.enrichment_report(&snapshot);
    let formatter = ctx.formatter;

    if formatter.is_json() {
        let rows: Vec<_> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "studyId": e.study.study_id,
                    "authors": e.study.authors,
                    "year": e.study.pub_year,
                    "missing": e.missing,
                })
            })
            .collect();
        println!("{}", formatter.json(&rows)?);
        return Ok(());
    }

    let rows = entries.iter().map(|e| {
        let missing: Vec<&str> = e.missing.iter().map(|f| f.as_str()).collect();
        vec![
            e.study.study_id.to_string(),
            format!("{} {}", e.study.authors, e.study.pub_year),
            or_dash(e.study.doi.as_deref()),
            missing.join(", "),
        ]
    });
    println!(
        "{}",
        formatter.table(
            &["ID", "Study", "DOI", "Missing"],
            rows,
            "Every study has the required fields."
        )
    );
    println!(
        "{}",
        formatter.info(&format!(
            "{} of {} studies incomplete",
            entries.len(),
            snapshot.studies.len()
        ))
    );
    Ok(())
}
