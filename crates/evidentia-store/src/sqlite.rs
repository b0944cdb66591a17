//! SQLite backend

use crate::StoreError;
use evidentia_domain::{
    Claim, ClaimId, Direction, EffectSize, EvidenceUsage, RemovedStudy, Repository, Snapshot,
    Study, StudyClaimLink, StudyId, StudyRecord, StudyStatus, UsageRole,
};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::debug;

const SAVED_MARKER: &str = "schema_version";
const SCHEMA_VERSION: &str = "1";

/// SQLite-backed registry
///
/// Tables mirror the snapshot lists one-to-one. `doi` is unique and indexed,
/// `final_score` has a descending index, and link/usage rows reference
/// `studies`/`claims` through foreign keys checked at commit.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// `SqliteStore` instance.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
    persisted: bool,
}

impl SqliteStore {
    /// Open (or create) the database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// Opening creates the file, but the store only [`exists`](Repository::exists)
    /// once a snapshot has been saved into it.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use evidentia_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("registry.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let mut store = Self {
            conn,
            path: path.to_path_buf(),
            persisted: false,
        };
        store.initialize_schema()?;
        store.persisted = store.has_saved_marker()?;
        Ok(store)
    }

    /// Database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// In-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        self.conn.pragma_update(None, "foreign_keys", true)?;
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    fn has_saved_marker(&self) -> Result<bool, StoreError> {
        let saved = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM registry_meta WHERE key = ?1)",
            params![SAVED_MARKER],
            |row| row.get(0),
        )?;
        Ok(saved)
    }

    fn parse_error(&self, table: &str, message: impl Into<String>) -> StoreError {
        StoreError::Parse {
            path: self.path.join(table),
            message: message.into(),
        }
    }

    fn load_studies(&self) -> Result<Vec<Study>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT study_id, authors, pub_year, title, journal, doi, study_type, sample_size,
                    quality_score, relevance_mult, final_score, landmark, direction, population,
                    key_finding, effect_sizes, verified_date, added_date, status, superseded_by, notes
             FROM studies ORDER BY rowid",
        )?;

        // (record without enums, direction, status, effect sizes json)
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i32>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, Option<String>>(7)?,
                    (row.get::<_, f64>(8)?, row.get::<_, f64>(9)?, row.get::<_, f64>(10)?),
                    row.get::<_, bool>(11)?,
                    row.get::<_, String>(12)?,
                    row.get::<_, String>(13)?,
                    row.get::<_, Option<String>>(14)?,
                    row.get::<_, String>(15)?,
                    (
                        row.get::<_, Option<String>>(16)?,
                        row.get::<_, Option<String>>(17)?,
                        row.get::<_, String>(18)?,
                        row.get::<_, Option<String>>(19)?,
                        row.get::<_, Option<String>>(20)?,
                    ),
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut studies = Vec::with_capacity(rows.len());
        for (
            study_id,
            authors,
            pub_year,
            title,
            journal,
            doi,
            study_type,
            sample_size,
            (quality_score, relevance_mult, final_score),
            landmark,
            direction,
            population,
            key_finding,
            effect_sizes,
            (verified_date, added_date, status, superseded_by, notes),
        ) in rows
        {
            let direction = Direction::parse(&direction).ok_or_else(|| {
                self.parse_error("studies", format!("{}: bad direction {:?}", study_id, direction))
            })?;
            let status = StudyStatus::parse(&status).ok_or_else(|| {
                self.parse_error("studies", format!("{}: bad status {:?}", study_id, status))
            })?;
            let effect_sizes: Vec<EffectSize> = serde_json::from_str(&effect_sizes)
                .map_err(|e| self.parse_error("studies", format!("{}: effect_sizes: {}", study_id, e)))?;

            let record = StudyRecord {
                study_id: StudyId::new(study_id),
                authors,
                pub_year,
                title,
                journal,
                doi,
                study_type,
                sample_size,
                quality_score,
                relevance_mult,
                final_score,
                landmark,
                direction,
                population,
                key_finding,
                effect_sizes,
                verified_date,
                added_date,
                status,
                superseded_by: superseded_by.map(StudyId::new),
                notes,
            };
            studies.push(Study::try_from(record)?);
        }
        Ok(studies)
    }

    fn load_claims(&self) -> Result<Vec<Claim>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT claim_id, description FROM claims ORDER BY rowid")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, description)| {
                let claim_id = ClaimId::parse(&id).map_err(|e| self.parse_error("claims", e))?;
                Ok(Claim::new(claim_id, description))
            })
            .collect()
    }

    fn load_links(&self) -> Result<Vec<StudyClaimLink>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT study_id, claim_id, direction FROM study_claims ORDER BY rowid")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(study_id, claim_id, direction)| {
                let claim_id =
                    ClaimId::parse(&claim_id).map_err(|e| self.parse_error("study_claims", e))?;
                let direction = match direction.as_deref().map(str::trim) {
                    None | Some("") => None,
                    Some(d) => Some(Direction::parse(d).ok_or_else(|| {
                        self.parse_error("study_claims", format!("bad direction {:?}", d))
                    })?),
                };
                Ok(StudyClaimLink {
                    study_id: StudyId::new(study_id),
                    claim_id,
                    direction,
                })
            })
            .collect()
    }

    fn load_usage(&self) -> Result<Vec<EvidenceUsage>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, study_id, page_file, card_id, role FROM evidence_usage ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, study_id, page_file, card_id, role)| {
                let role = UsageRole::parse(&role).ok_or_else(|| {
                    self.parse_error("evidence_usage", format!("{}: bad role {:?}", id, role))
                })?;
                Ok(EvidenceUsage {
                    id,
                    study_id: StudyId::new(study_id),
                    page_file,
                    card_id,
                    role,
                })
            })
            .collect()
    }

    fn load_removed(&self) -> Result<Vec<RemovedStudy>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT study_id, authors, pub_year, doi, removed_from, replaced_by, reason, removed_date
             FROM removed_studies ORDER BY id",
        )?;
        let removed = stmt
            .query_map([], |row| {
                Ok(RemovedStudy {
                    study_id: StudyId::new(row.get::<_, String>(0)?),
                    authors: row.get(1)?,
                    pub_year: row.get(2)?,
                    doi: row.get(3)?,
                    removed_from: row.get(4)?,
                    replaced_by: row.get::<_, Option<String>>(5)?.map(StudyId::new),
                    reason: row.get(6)?,
                    removed_date: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(removed)
    }
}

impl Repository for SqliteStore {
    type Error = StoreError;

    fn load(&self) -> Result<Snapshot, Self::Error> {
        let snapshot = Snapshot {
            studies: self.load_studies()?,
            claims: self.load_claims()?,
            study_claims: self.load_links()?,
            evidence_usage: self.load_usage()?,
            removed_studies: self.load_removed()?,
        };
        snapshot.validate()?;

        debug!(
            path = %self.path.display(),
            studies = snapshot.studies.len(),
            claims = snapshot.claims.len(),
            "loaded registry database"
        );
        Ok(snapshot)
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error> {
        snapshot.validate()?;

        let mut effect_sizes = Vec::with_capacity(snapshot.studies.len());
        for study in &snapshot.studies {
            let json = serde_json::to_string(&study.effect_sizes)
                .map_err(|e| self.parse_error("studies", e.to_string()))?;
            effect_sizes.push(json);
        }

        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM evidence_usage;
             DELETE FROM study_claims;
             DELETE FROM removed_studies;
             DELETE FROM claims;
             DELETE FROM studies;",
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO registry_meta (key, value) VALUES (?1, ?2)",
            params![SAVED_MARKER, SCHEMA_VERSION],
        )?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO studies (study_id, authors, pub_year, title, journal, doi, study_type,
                    sample_size, quality_score, relevance_mult, final_score, landmark, direction,
                    population, key_finding, effect_sizes, verified_date, added_date, status,
                    superseded_by, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                    ?17, ?18, ?19, ?20, ?21)",
            )?;
            for (study, effects) in snapshot.studies.iter().zip(&effect_sizes) {
                insert.execute(params![
                    study.study_id.as_str(),
                    &study.authors,
                    study.pub_year,
                    &study.title,
                    &study.journal,
                    &study.doi,
                    study.study_type.map(|t| t.label()),
                    &study.sample_size,
                    study.quality_score(),
                    study.relevance_mult(),
                    study.final_score(),
                    study.landmark,
                    study.direction.symbol(),
                    &study.population,
                    &study.key_finding,
                    effects,
                    &study.verified_date,
                    &study.added_date,
                    study.status.as_str(),
                    study.superseded_by.as_ref().map(StudyId::as_str),
                    &study.notes,
                ])?;
            }

            let mut insert = tx.prepare(
                "INSERT INTO claims (claim_id, exposure, outcome, description) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for claim in &snapshot.claims {
                insert.execute(params![
                    claim.claim_id.as_str(),
                    claim.exposure(),
                    claim.outcome(),
                    &claim.description,
                ])?;
            }

            let mut insert = tx.prepare(
                "INSERT INTO study_claims (study_id, claim_id, direction) VALUES (?1, ?2, ?3)",
            )?;
            for link in &snapshot.study_claims {
                insert.execute(params![
                    link.study_id.as_str(),
                    link.claim_id.as_str(),
                    link.direction.map(|d| d.symbol()),
                ])?;
            }

            let mut insert = tx.prepare(
                "INSERT INTO evidence_usage (id, study_id, page_file, card_id, role)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for usage in &snapshot.evidence_usage {
                insert.execute(params![
                    &usage.id,
                    usage.study_id.as_str(),
                    &usage.page_file,
                    &usage.card_id,
                    usage.role.as_str(),
                ])?;
            }

            let mut insert = tx.prepare(
                "INSERT INTO removed_studies (study_id, authors, pub_year, doi, removed_from,
                    replaced_by, reason, removed_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for removed in &snapshot.removed_studies {
                insert.execute(params![
                    removed.study_id.as_str(),
                    &removed.authors,
                    removed.pub_year,
                    &removed.doi,
                    &removed.removed_from,
                    removed.replaced_by.as_ref().map(StudyId::as_str),
                    &removed.reason,
                    &removed.removed_date,
                ])?;
            }
        }

        tx.commit()?;
        self.persisted = true;

        debug!(
            path = %self.path.display(),
            studies = snapshot.studies.len(),
            "saved registry database"
        );
        Ok(())
    }

    fn exists(&self) -> bool {
        self.persisted
    }
}
