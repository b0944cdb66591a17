//! Query command implementation.

use crate::cli::QueryArgs;
use crate::commands::{load_existing, Context};
use crate::error::{CliError, Result};
use crate::output::{format_score, or_dash, truncate};
use evidentia_domain::{ClaimId, LinkedStudy};
use evidentia_store::RegistryStore;
use evidentia_synthesizer::ranked_studies;

/// Execute the query command.
///
/// Fails with [`CliError::NotFound`] when no study backs the claim, after
/// listing claims whose id contains the query.
pub fn execute_query(args: QueryArgs, store: &RegistryStore, ctx: &Context<'_>) -> Result<()> {
    let snapshot = load_existing(store)?;
    let formatter = ctx.formatter;

    let linked = match ClaimId::parse(&args.claim) {
        Ok(claim) => ranked_studies(&snapshot, &claim, args.direction),
        Err(_) => Vec::new(),
    };

    if linked.is_empty() {
        let suggestions = snapshot.suggest_claims(&args.claim);
        println!(
            "{}",
            formatter.warning(&format!("No studies found for '{}'", args.claim))
        );
        if !suggestions.is_empty() {
            println!("Did you mean:");
            for claim in suggestions {
                println!("  {}", claim);
            }
        }
        return Err(CliError::NotFound(format!("claim {}", args.claim)));
    }

    if formatter.is_json() {
        let rows: Vec<_> = linked.iter().map(json_row).collect();
        println!("{}", formatter.json(&rows)?);
        return Ok(());
    }

    let rows = linked.iter().map(|l| {
        let study = l.study;
        let mut who = format!("{} {}", study.authors, study.pub_year);
        if study.landmark {
            who.push_str(" ★");
        }
        if study.population != "all" {
            who.push_str(&format!(" [{}]", study.population));
        }
        vec![
            formatter.direction(l.direction),
            who,
            or_dash(study.study_type.map(|t| t.label())),
            format_score(study.final_score()),
            truncate(&or_dash(study.key_finding.as_deref()), 60),
            or_dash(study.doi.as_deref()),
        ]
    });

    println!(
        "{}",
        formatter.heading(&format!("{} ({} studies)", args.claim, linked.len()))
    );
    println!(
        "{}",
        formatter.table(
            &["Dir", "Study", "Type", "Score", "Finding", "DOI"],
            rows,
            "No studies found."
        )
    );
    Ok(())
}

fn json_row(linked: &LinkedStudy<'_>) -> serde_json::Value {
    let study = linked.study;
    serde_json::json!({
        "studyId": study.study_id,
        "direction": linked.direction,
        "authors": study.authors,
        "year": study.pub_year,
        "studyType": study.study_type.map(|t| t.label()),
        "finalScore": study.final_score(),
        "landmark": study.landmark,
        "population": study.population,
        "keyFinding": study.key_finding,
        "doi": study.doi,
        "status": study.status.as_str(),
    })
}
