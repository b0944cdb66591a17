//! Summary, export-summary and gaps command implementations.

use crate::cli::{CategoryArgs, ExportSummaryArgs};
use crate::commands::{load_existing, Context};
use crate::error::{CliError, Result};
use evidentia_store::RegistryStore;
use evidentia_synthesizer::{
    gap_report, render_summary_table, splice_summary_table, summarize, SummaryRow,
};
use std::fs;
use tracing::info;

const SUMMARY_HEADERS: [&str; 9] = [
    "Claim", "#+", "#−", "#±", "Best+", "Best−", "Net", "Confidence", "Gap?",
];

/// Execute the summary command.
pub fn execute_summary(store: &RegistryStore, ctx: &Context<'_>) -> Result<()> {
    let snapshot = load_existing(store)?;
    let rows: Vec<SummaryRow> = summarize(&snapshot).iter().map(|s| s.to_row()).collect();
    let formatter = ctx.formatter;

    if formatter.is_json() {
        println!("{}", formatter.json(&rows)?);
        return Ok(());
    }

    let cells = rows.iter().map(|r| {
        vec![
            r.claim.clone(),
            r.n_plus.to_string(),
            r.n_minus.to_string(),
            r.n_mixed.to_string(),
            r.best_plus.clone(),
            r.best_minus.clone(),
            r.net.clone(),
            r.confidence.to_string(),
            r.gap.clone(),
        ]
    });
    println!(
        "{}",
        formatter.table(&SUMMARY_HEADERS, cells, "No claims have linked studies yet.")
    );
    Ok(())
}

/// Execute the export-summary command.
///
/// Rewrites the summary table inside the document in place; the rest of the
/// document is left byte-for-byte as it was.
pub fn execute_export_summary(
    args: ExportSummaryArgs,
    store: &RegistryStore,
    ctx: &Context<'_>,
) -> Result<()> {
    let snapshot = load_existing(store)?;
    let rows: Vec<SummaryRow> = summarize(&snapshot).iter().map(|s| s.to_row()).collect();

    let document = fs::read_to_string(&args.file).map_err(|e| {
        CliError::InvalidInput(format!("Cannot read {}: {}", args.file.display(), e))
    })?;
    let updated = splice_summary_table(&document, &render_summary_table(&rows))?;
    fs::write(&args.file, updated)?;

    info!(file = %args.file.display(), claims = rows.len(), "exported summary table");
    println!(
        "{}",
        ctx.formatter.success(&format!(
            "Updated summary table in {} ({} claims)",
            args.file.display(),
            rows.len()
        ))
    );
    Ok(())
}

/// Execute the gaps command.
pub fn execute_gaps(args: CategoryArgs, store: &RegistryStore, ctx: &Context<'_>) -> Result<()> {
    let snapshot = load_existing(store)?;
    let mut summary = summarize(&snapshot);

    if let Some(category) = args.category.as_deref() {
        let categories = ctx.config.category_map();
        summary.retain(|s| categories.contains(category, &s.claim_id));
        if summary.is_empty() {
            return Err(CliError::NotFound(format!(
                "no claims with evidence in category '{}'",
                category
            )));
        }
    }

    let report = gap_report(&summary);
    let formatter = ctx.formatter;

    if formatter.is_json() {
        println!("{}", formatter.json(&report)?);
        return Ok(());
    }

    let cells = report.entries.iter().map(|e| {
        vec![
            e.claim.clone(),
            e.n_plus.to_string(),
            e.n_minus.to_string(),
            e.confidence.to_string(),
            e.describe(),
        ]
    });
    println!(
        "{}",
        formatter.table(
            &["Claim", "#+", "#−", "Confidence", "Needs"],
            cells,
            "No evidence gaps."
        )
    );
    println!(
        "{}",
        formatter.info(&format!(
            "{} of {} claims need more evidence",
            report.entries.len(),
            report.total_claims
        ))
    );
    Ok(())
}
