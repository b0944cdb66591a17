//! Command implementations.
//!
//! Every command loads the snapshot once, works on it in memory and saves
//! at most once.

pub mod add;
pub mod export;
pub mod import;
pub mod init;
pub mod lifecycle;
pub mod query;
pub mod stats;
pub mod summary;
pub mod verify;

pub use self::add::execute_add;
pub use self::export::execute_export_refs;
pub use self::import::{execute_import, execute_import_refs};
pub use self::init::execute_init;
pub use self::lifecycle::{
    execute_enrich_all, execute_retract, execute_reverify, execute_stale, execute_supersede,
};
pub use self::query::execute_query;
pub use self::stats::execute_stats;
pub use self::summary::{execute_export_summary, execute_gaps, execute_summary};
pub use self::verify::execute_verify_dois;

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use chrono::NaiveDate;
use evidentia_domain::{ClaimId, Repository, Snapshot, StudyId};
use evidentia_store::RegistryStore;

/// What every command needs besides its arguments and the store.
pub struct Context<'a> {
    /// Loaded configuration
    pub config: &'a Config,
    /// Output formatter
    pub formatter: &'a Formatter,
    /// Reference date for staleness and timestamps
    pub today: NaiveDate,
}

/// Load the snapshot, failing when nothing has been persisted yet.
pub fn load_existing(store: &RegistryStore) -> Result<Snapshot> {
    if !store.exists() {
        return Err(CliError::StoreMissing(store.path().to_path_buf()));
    }
    Ok(store.load()?)
}

/// Parse a claim id given on the command line.
pub fn parse_claim(raw: &str) -> Result<ClaimId> {
    ClaimId::parse(raw).map_err(CliError::InvalidInput)
}

/// Look up a study id given on the command line.
pub fn require_study(snapshot: &Snapshot, raw: &str) -> Result<StudyId> {
    let id = StudyId::new(raw.trim());
    if snapshot.study(&id).is_none() {
        return Err(CliError::NotFound(format!("study {}", id)));
    }
    Ok(id)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by the command tests.

    use super::*;
    use crate::config::OutputFormat;
    use evidentia_domain::{Direction, Relevance, Score, Study};
    use tempfile::TempDir;

    pub struct Harness {
        pub dir: TempDir,
        pub config: Config,
        pub formatter: Formatter,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
                config: Config::default(),
                formatter: Formatter::new(OutputFormat::Table, false),
            }
        }

        /// Store handle on the harness document.
        pub fn store(&self) -> RegistryStore {
            RegistryStore::open(self.dir.path().join("studies.json"), None).unwrap()
        }

        pub fn context(&self) -> Context<'_> {
            Context {
                config: &self.config,
                formatter: &self.formatter,
                today: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            }
        }

        /// Persist two linked studies on `protein→muscle`.
        pub fn seed(&self) -> (StudyId, StudyId) {
            let mut snapshot = Snapshot::new();
            let claim = ClaimId::parse("protein→muscle").unwrap();
            snapshot.ensure_claim(claim.clone(), None);

            let mut morton = Study::new(
                StudyId::new("morton-2018-a1b2"),
                "Morton",
                2018,
                Score::new(12.0, Relevance::Full).unwrap(),
                Direction::Supports,
            )
            .with_doi("10.1136/bjsports-2017-097608");
            morton.verified_date = Some("2026-02".to_string());

            let tang = Study::new(
                StudyId::new("tang-2009-c3d4"),
                "Tang",
                2009,
                Score::new(9.0, Relevance::Half).unwrap(),
                Direction::Contradicts,
            );

            for study in [morton, tang] {
                let id = study.study_id.clone();
                snapshot.insert_study(study).unwrap();
                snapshot.link(&id, &claim, None).unwrap();
            }
            self.store().save(&snapshot).unwrap();
            (
                StudyId::new("morton-2018-a1b2"),
                StudyId::new("tang-2009-c3d4"),
            )
        }

        pub fn snapshot(&self) -> Snapshot {
            self.store().load().unwrap()
        }
    }

    #[test]
    fn test_load_existing_requires_a_store() {
        let harness = Harness::new();
        assert!(matches!(
            load_existing(&harness.store()),
            Err(CliError::StoreMissing(_))
        ));
    }

    #[test]
    fn test_require_study() {
        let harness = Harness::new();
        harness.seed();
        let snapshot = harness.snapshot();
        assert!(require_study(&snapshot, " morton-2018-a1b2 ").is_ok());
        assert!(matches!(
            require_study(&snapshot, "nobody-1900-0000"),
            Err(CliError::NotFound(_))
        ));
    }
}
