//! Consensus over a small registry, exercised through the public API only.

use evidentia_domain::{
    ClaimId, Direction, Relevance, Score, Snapshot, Study, StudyId, StudyStatus,
};
use evidentia_synthesizer::{
    citations_for_all, gap_report, render_summary_table, summarize, Confidence, Gap,
    NetDirection,
};

fn claim(id: &str) -> ClaimId {
    ClaimId::parse(id).unwrap()
}

fn add(
    snapshot: &mut Snapshot,
    id: &str,
    quality: f64,
    relevance: Relevance,
    direction: Direction,
    claims: &[(&str, Option<Direction>)],
) {
    let study = Study::new(
        StudyId::new(id),
        id,
        2020,
        Score::new(quality, relevance).unwrap(),
        direction,
    );
    snapshot.insert_study(study).unwrap();
    for (c, link_direction) in claims {
        snapshot.ensure_claim(claim(c), None);
        snapshot
            .link(&StudyId::new(id), &claim(c), *link_direction)
            .unwrap();
    }
}

fn registry() -> Snapshot {
    let mut s = Snapshot::new();
    // sleep→mortality: contested, support has the stronger top study
    add(&mut s, "cappuccio", 13.0, Relevance::Full, Direction::Supports, &[("sleep-duration→mortality", None)]);
    add(&mut s, "kripke", 10.0, Relevance::Full, Direction::Contradicts, &[("sleep-duration→mortality", None)]);
    // a supporting study whose link says it contradicts this claim
    add(
        &mut s,
        "yin",
        11.0,
        Relevance::Half,
        Direction::Supports,
        &[
            ("sleep-duration→mortality", None),
            ("long-sleep→cvd", Some(Direction::Contradicts)),
        ],
    );
    // protein→muscle: mixed only
    add(&mut s, "morton", 9.0, Relevance::Full, Direction::Mixed, &[("protein→muscle", None)]);
    s
}

#[test]
fn test_summary_partitions_and_verdicts() {
    let snapshot = registry();
    let summary = summarize(&snapshot);
    let ids: Vec<String> = summary.iter().map(|s| s.claim_id.to_string()).collect();
    assert_eq!(ids, ["long-sleep→cvd", "protein→muscle", "sleep-duration→mortality"]);

    let cvd = &summary[0];
    assert!(cvd.plus.is_empty());
    assert_eq!(cvd.minus.len(), 1);
    assert_eq!(cvd.net, NetDirection::Clear(Direction::Contradicts));
    assert_eq!(cvd.gap, Some(Gap::NeedSupporting));
    assert_eq!(cvd.confidence, Confidence::Limited);

    let protein = &summary[1];
    assert_eq!(protein.net, NetDirection::Clear(Direction::Mixed));
    assert_eq!(protein.gap, None);

    let sleep = &summary[2];
    assert_eq!(sleep.plus.len(), 2);
    assert_eq!(sleep.plus[0].study.study_id.as_str(), "cappuccio");
    assert_eq!(sleep.net, NetDirection::Contested(Direction::Supports));
    assert_eq!(sleep.confidence, Confidence::Strong);
    assert_eq!(sleep.to_row().net, "+ (contested)");
}

#[test]
fn test_retired_studies_still_count() {
    let mut snapshot = registry();
    snapshot.study_mut(&StudyId::new("kripke")).unwrap().status = StudyStatus::Retracted;

    let summary = summarize(&snapshot);
    let sleep = summary
        .iter()
        .find(|s| s.claim_id == claim("sleep-duration→mortality"))
        .unwrap();
    assert_eq!(sleep.minus.len(), 1);
}

#[test]
fn test_gap_report_is_stricter_than_the_flag() {
    let snapshot = registry();
    let summary = summarize(&snapshot);
    let report = gap_report(&summary);

    assert_eq!(report.total_claims, 3);
    // sleep has two supporting and one contradicting study: no gap
    let claims: Vec<&str> = report.entries.iter().map(|e| e.claim.as_str()).collect();
    assert_eq!(claims, ["long-sleep→cvd", "protein→muscle"]);
    assert_eq!(report.entries[0].describe(), "Need 2 more supporting");
}

#[test]
fn test_citations_feature_the_best_study_per_claim() {
    let snapshot = registry();
    let citations = citations_for_all(&snapshot);

    let featured: Vec<(&str, &str)> = citations
        .iter()
        .filter(|c| c.featured)
        .map(|c| (c.claim.as_str(), c.study_id.as_str()))
        .collect();
    assert_eq!(
        featured,
        [
            ("long-sleep→cvd", "yin"),
            ("protein→muscle", "morton"),
            ("sleep-duration→mortality", "cappuccio"),
        ]
    );
}

#[test]
fn test_rendered_table_has_a_row_per_claim() {
    let snapshot = registry();
    let rows: Vec<_> = summarize(&snapshot).iter().map(|s| s.to_row()).collect();
    let table = render_summary_table(&rows);
    assert_eq!(table.lines().count(), 2 + 3);
    assert!(table.contains("| `protein→muscle` | 0 | 0 | 1 | — | — | ± | Limited |  |"));
}
