//! End-to-end workflow through the command layer on a SQLite store.

use chrono::NaiveDate;
use evidentia_cli::cli::{ExportSummaryArgs, ImportArgs, QueryArgs, SupersedeArgs};
use evidentia_cli::commands::{self, Context};
use evidentia_cli::config::OutputFormat;
use evidentia_cli::{CliError, Config, Formatter};
use evidentia_domain::{ClaimId, Repository, StudyStatus};
use evidentia_store::RegistryStore;
use std::fs;
use tempfile::TempDir;

const REGISTRY: &str = "\
# Study Registry

## Claim Tag Vocabulary
| Tag | Description |
|-----|-------------|
| `protein→muscle` | Protein intake and lean mass |

## Claim Summary Index
| Claim | #+ | #− | #± | Best+ | Best− | Net | Confidence | Gap? |
|-------|----|----|-----|-------|-------|-----|------------|------|

## Protein
| Study | Age | DOI | Type | N | Score | LM | Dir | Pop | Claims | Used in | Notes |
|---|---|---|---|---|---|---|---|---|---|---|---|
| Morton | 8 | 10.1136/bjsports-2017-097608 | MA | 1863 | 12 | Y | + | all | `protein→muscle` | q2(F) | Plateau near 1.6 g/kg |
| Tang | 2009 | 10.1152/japplphysiol.00076.2009 | RCT | 18 | 9 | N | - | men | `protein→muscle` | q3 | Whey beats soy |
";

#[test]
fn test_import_summarize_and_retire() {
    let dir = TempDir::new().unwrap();
    let registry = dir.path().join("study-registry.md");
    fs::write(&registry, REGISTRY).unwrap();

    let config = Config::default();
    let formatter = Formatter::new(OutputFormat::Table, false);
    let ctx = Context {
        config: &config,
        formatter: &formatter,
        today: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
    };
    let mut store = RegistryStore::open(dir.path().join("registry.db"), None).unwrap();

    // nothing to query before the first import
    let early = commands::execute_query(
        QueryArgs {
            claim: "protein→muscle".to_string(),
            direction: None,
        },
        &store,
        &ctx,
    );
    assert!(matches!(early, Err(CliError::StoreMissing(_))));

    commands::execute_import(
        ImportArgs {
            file: registry.clone(),
        },
        &mut store,
        &ctx,
    )
    .unwrap();

    let snapshot = store.load().unwrap();
    assert_eq!(snapshot.studies.len(), 2);
    let claim = ClaimId::parse("protein→muscle").unwrap();
    assert_eq!(snapshot.linked_studies(&claim).len(), 2);

    commands::execute_export_summary(
        ExportSummaryArgs {
            file: registry.clone(),
        },
        &store,
        &ctx,
    )
    .unwrap();
    let document = fs::read_to_string(&registry).unwrap();
    assert!(document.contains("| `protein→muscle` | 1 | 1 | 0 |"));
    assert!(document.contains("## Protein"));

    let morton = snapshot
        .study_by_doi("10.1136/bjsports-2017-097608")
        .unwrap()
        .study_id
        .clone();
    let tang = snapshot
        .study_by_doi("10.1152/japplphysiol.00076.2009")
        .unwrap()
        .study_id
        .clone();

    commands::execute_supersede(
        SupersedeArgs {
            old_id: tang.to_string(),
            new_id: morton.to_string(),
        },
        &mut store,
        &ctx,
    )
    .unwrap();

    // a fresh handle sees the persisted transition
    let reopened = RegistryStore::open(dir.path().join("registry.db"), None).unwrap();
    let snapshot = reopened.load().unwrap();
    let retired = snapshot.study(&tang).unwrap();
    assert_eq!(retired.status, StudyStatus::Superseded);
    assert_eq!(retired.superseded_by.as_ref(), Some(&morton));
    assert_eq!(snapshot.removed_studies.len(), 1);
}

#[test]
fn test_read_commands_keep_failing_on_a_missing_sqlite_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registry.db");
    let config = Config::default();
    let formatter = Formatter::new(OutputFormat::Table, false);
    let ctx = Context {
        config: &config,
        formatter: &formatter,
        today: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
    };

    for _ in 0..2 {
        let store = RegistryStore::open(&path, None).unwrap();
        let result = commands::execute_summary(&store, &ctx);
        assert!(matches!(result, Err(CliError::StoreMissing(_))));
    }
}
