//! Export-refs command implementation.

use crate::cli::ExportRefsArgs;
use crate::commands::{load_existing, parse_claim, Context};
use crate::error::{CliError, Result};
use crate::output::{format_score, or_dash};
use evidentia_store::RegistryStore;
use evidentia_synthesizer::{citations_for_all, citations_for_claim};

/// Execute the export-refs command.
///
/// `all` exports every linked claim; otherwise only the named one.
pub fn execute_export_refs(
    args: ExportRefsArgs,
    store: &RegistryStore,
    ctx: &Context<'_>,
) -> Result<()> {
    let snapshot = load_existing(store)?;

    let citations = if args.claim.trim().eq_ignore_ascii_case("all") {
        citations_for_all(&snapshot)
    } else {
        citations_for_claim(&snapshot, &parse_claim(&args.claim)?)
    };
    if citations.is_empty() {
        return Err(CliError::NotFound(format!(
            "no citations for '{}'",
            args.claim
        )));
    }

    let formatter = ctx.formatter;
    if args.json || formatter.is_json() {
        println!("{}", formatter.json(&citations)?);
        return Ok(());
    }

    let rows = citations.iter().map(|c| {
        vec![
            c.claim.clone(),
            if c.featured { "★".to_string() } else { String::new() },
            c.detail.clone(),
            c.badge.clone(),
            format_score(c.final_score),
            or_dash(c.link.as_deref()),
        ]
    });
    println!(
        "{}",
        formatter.table(
            &["Claim", "", "Citation", "Badge", "Score", "Link"],
            rows,
            "No citations."
        )
    );
    Ok(())
}
