//! Conformance tests for evidentia-store
//!
//! Every assertion runs against both backends; they must be indistinguishable
//! through the `Repository` contract.

use evidentia_domain::{
    ClaimId, Direction, EvidenceUsage, Relevance, RemovedStudy, Repository, Score, Snapshot,
    Study, StudyId, StudyStatus, StudyType, UsageRole,
};
use evidentia_store::{Backend, RegistryStore, StoreError};
use tempfile::TempDir;

fn open(dir: &TempDir, backend: Backend) -> RegistryStore {
    let file = match backend {
        Backend::Json => "studies.json",
        Backend::Sqlite => "registry.db",
    };
    RegistryStore::open(dir.path().join(file), Some(backend)).unwrap()
}

fn backends() -> [Backend; 2] {
    [Backend::Json, Backend::Sqlite]
}

fn sample_snapshot() -> Snapshot {
    let mut snapshot = Snapshot::new();

    let mut morton = Study::new(
        StudyId::new("morton-2018-a1b2"),
        "Morton et al.",
        2018,
        Score::new(13.0, Relevance::Full).unwrap(),
        Direction::Supports,
    )
    .with_doi("https://doi.org/10.1136/bjsports-2017-097608");
    morton.study_type = Some(StudyType::MetaAnalysis);
    morton.sample_size = Some("1,863".to_string());
    morton.landmark = true;
    morton.key_finding = Some("Protein supplementation augments strength gains".to_string());
    morton.verified_date = Some("2025-01".to_string());

    let mut old = Study::new(
        StudyId::new("lee-2012-c3d4"),
        "Lee",
        2012,
        Score::new(12.0, Relevance::Half).unwrap(),
        Direction::Contradicts,
    );
    old.population = "older adults".to_string();
    old.status = StudyStatus::Superseded;
    old.superseded_by = Some(morton.study_id.clone());

    snapshot.insert_study(old).unwrap();
    snapshot.insert_study(morton).unwrap();

    let claim = ClaimId::parse("protein-dose→muscle").unwrap();
    snapshot.ensure_claim(claim.clone(), Some("More protein, more muscle".to_string()));
    snapshot.ensure_claim(ClaimId::parse("protein->mortality").unwrap(), None);

    snapshot
        .link(&StudyId::new("morton-2018-a1b2"), &claim, None)
        .unwrap();
    snapshot
        .link(&StudyId::new("lee-2012-c3d4"), &claim, Some(Direction::Mixed))
        .unwrap();

    snapshot
        .add_usage(EvidenceUsage::new(
            StudyId::new("morton-2018-a1b2"),
            "protein-evidence.html",
            "q3",
            UsageRole::Featured,
        ))
        .unwrap();

    snapshot.record_removal(RemovedStudy {
        study_id: StudyId::new("gone-2001-ffff"),
        authors: "Gone".to_string(),
        pub_year: 2001,
        doi: None,
        removed_from: Some("protein".to_string()),
        replaced_by: None,
        reason: "Retracted by journal".to_string(),
        removed_date: "2025-02-01".to_string(),
    });

    snapshot
}

#[test]
fn test_missing_store_loads_empty() {
    for backend in backends() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir, backend);
        assert!(!store.exists(), "{:?}", backend);
        let snapshot = store.load().unwrap();
        assert_eq!(snapshot, Snapshot::new(), "{:?}", backend);
    }
}

#[test]
fn test_save_then_load_preserves_snapshot() {
    for backend in backends() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir, backend);
        let snapshot = sample_snapshot();

        store.save(&snapshot).unwrap();
        assert!(store.exists(), "{:?}", backend);

        let reopened = open(&dir, backend);
        assert_eq!(reopened.load().unwrap(), snapshot, "{:?}", backend);
    }
}

#[test]
fn test_save_replaces_previous_contents() {
    for backend in backends() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir, backend);
        store.save(&sample_snapshot()).unwrap();

        let mut smaller = store.load().unwrap();
        smaller.evidence_usage.clear();
        smaller.study_claims.retain(|l| l.study_id.as_str() != "lee-2012-c3d4");
        store.save(&smaller).unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded.evidence_usage.is_empty(), "{:?}", backend);
        assert_eq!(loaded.study_claims.len(), 1, "{:?}", backend);
        assert_eq!(loaded.studies.len(), 2, "{:?}", backend);
    }
}

#[test]
fn test_insertion_order_is_stable() {
    for backend in backends() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir, backend);
        store.save(&sample_snapshot()).unwrap();

        let loaded = store.load().unwrap();
        let ids: Vec<&str> = loaded.studies.iter().map(|s| s.study_id.as_str()).collect();
        assert_eq!(ids, ["lee-2012-c3d4", "morton-2018-a1b2"], "{:?}", backend);
    }
}

#[test]
fn test_final_score_recomputed_after_reload() {
    for backend in backends() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir, backend);
        store.save(&sample_snapshot()).unwrap();

        for study in store.load().unwrap().studies {
            assert_eq!(
                study.final_score(),
                study.quality_score() * study.relevance_mult(),
                "{:?}",
                backend
            );
        }
    }
}

#[test]
fn test_save_rejects_duplicate_doi() {
    for backend in backends() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir, backend);

        let mut snapshot = sample_snapshot();
        let mut clone = snapshot.studies[1].clone();
        clone.study_id = StudyId::new("copy-2018-0000");
        snapshot.studies.push(clone);

        let result = store.save(&snapshot);
        assert!(matches!(result, Err(StoreError::Invalid(_))), "{:?}", backend);
        assert!(!store.exists(), "{:?}", backend);
    }
}

#[test]
fn test_link_direction_override_survives() {
    for backend in backends() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir, backend);
        store.save(&sample_snapshot()).unwrap();

        let loaded = store.load().unwrap();
        let claim = ClaimId::parse("protein-dose→muscle").unwrap();
        let linked = loaded.linked_studies(&claim);
        assert_eq!(linked[0].direction, Direction::Mixed, "{:?}", backend);
        assert_eq!(linked[1].direction, Direction::Supports, "{:?}", backend);
    }
}
