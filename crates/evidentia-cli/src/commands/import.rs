//! Import and import-refs command implementations.

use crate::cli::{ImportArgs, ImportRefsArgs};
use crate::commands::Context;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use evidentia_domain::Repository;
use evidentia_extractor::{ImportReport, Importer};
use evidentia_store::RegistryStore;
use std::fs;
use tracing::info;

/// Execute the import command.
///
/// Bad rows never abort the run; they are listed after the summary.
pub fn execute_import(
    args: ImportArgs,
    store: &mut RegistryStore,
    ctx: &Context<'_>,
) -> Result<()> {
    let text = fs::read_to_string(&args.file).map_err(|e| {
        CliError::InvalidInput(format!("Cannot read {}: {}", args.file.display(), e))
    })?;

    let mut snapshot = store.load()?;
    let importer = Importer::new(ctx.config.import.clone());
    let report = importer.import_markdown(&mut snapshot, &text, ctx.today)?;
    store.save(&snapshot)?;

    info!(
        file = %args.file.display(),
        added = report.studies_added,
        failed = report.failures.len(),
        "imported registry"
    );
    print_report(&report, ctx.formatter)
}

/// Execute the import-refs command.
pub fn execute_import_refs(
    args: ImportRefsArgs,
    store: &mut RegistryStore,
    ctx: &Context<'_>,
) -> Result<()> {
    let page = args.page.trim().trim_end_matches(".json").to_string();
    if page.is_empty() {
        return Err(CliError::InvalidInput("Page name is empty".to_string()));
    }
    let path = args.dir.join(format!("{}.json", page));
    let json = fs::read_to_string(&path)
        .map_err(|e| CliError::InvalidInput(format!("Cannot read {}: {}", path.display(), e)))?;

    let mut snapshot = store.load()?;
    let importer = Importer::new(ctx.config.import.clone());
    let report = importer.import_refs(&mut snapshot, &page, &json, ctx.today)?;
    store.save(&snapshot)?;

    info!(page = %page, added = report.studies_added, "imported page references");
    print_report(&report, ctx.formatter)
}

fn print_report(report: &ImportReport, formatter: &Formatter) -> Result<()> {
    if formatter.is_json() {
        println!("{}", formatter.json(report)?);
        return Ok(());
    }

    println!(
        "{}",
        formatter.success(&format!(
            "Imported {} new studies ({} already registered)",
            report.studies_added, report.duplicates_skipped
        ))
    );
    println!(
        "  {} claims, {} links, {} usages added",
        report.claims_added, report.links_added, report.usages_added
    );

    if !report.is_clean() {
        println!(
            "{}",
            formatter.warning(&format!("{} entries skipped:", report.failures.len()))
        );
        for failure in &report.failures {
            println!("  {}: {}", failure.location, failure.reason);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::Harness;
    use std::path::PathBuf;

    const REGISTRY: &str = "\
## Claim Tag Vocabulary
| Tag | Description |
|-----|-------------|
| `sleep→mortality` | Sleep duration and all-cause mortality |

## Sleep
| Study | Age | DOI | Type | N | Score | LM | Dir | Pop | Claims | Used in | Notes |
|---|---|---|---|---|---|---|---|---|---|---|---|
| Cappuccio | 16 | 10.1093/sleep/33.5.585 | MA | 1382999 | 13 | Y | + | all | `sleep→mortality` | q1(F) | U-shaped risk |
| Broken | 2010 | — | MA | 10 | 9 | N | ?? | all | `sleep→mortality` | q1 | bad direction |
";

    #[test]
    fn test_import_creates_store_and_reports_failures() {
        let harness = Harness::new();
        let file = harness.dir.path().join("study-registry.md");
        fs::write(&file, REGISTRY).unwrap();
        let mut store = harness.store();

        execute_import(ImportArgs { file }, &mut store, &harness.context()).unwrap();

        let snapshot = harness.snapshot();
        assert_eq!(snapshot.studies.len(), 1);
        assert_eq!(snapshot.study_claims.len(), 1);
        assert_eq!(snapshot.evidence_usage.len(), 1);
    }

    #[test]
    fn test_import_missing_file() {
        let harness = Harness::new();
        let mut store = harness.store();
        let args = ImportArgs {
            file: PathBuf::from("/nonexistent/registry.md"),
        };
        assert!(matches!(
            execute_import(args, &mut store, &harness.context()),
            Err(CliError::InvalidInput(_))
        ));
        assert!(!store.exists());
    }

    #[test]
    fn test_import_refs_reads_page_from_dir() {
        let harness = Harness::new();
        let pages = harness.dir.path().join("pages");
        fs::create_dir_all(&pages).unwrap();
        fs::write(
            pages.join("sleep.json"),
            r#"{"cards": [{"id": "q2", "studyRefs": ["<div>[1] Walker (2017) \"Why we sleep\" <a href=\"https://doi.org/10.9999/new-ref\">x</a></div>"]}]}"#,
        )
        .unwrap();
        let mut store = harness.store();

        let args = ImportRefsArgs {
            page: "sleep".to_string(),
            dir: pages,
        };
        execute_import_refs(args, &mut store, &harness.context()).unwrap();

        let snapshot = harness.snapshot();
        assert_eq!(snapshot.studies.len(), 1);
        assert_eq!(snapshot.evidence_usage[0].page_file, "sleep-evidence.html");
        assert_eq!(snapshot.evidence_usage[0].card_id, "q2");
    }
}
