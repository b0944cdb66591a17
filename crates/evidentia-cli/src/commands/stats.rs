//! Stats command implementation.

use crate::commands::{load_existing, Context};
use crate::error::Result;
use evidentia_domain::{Direction, Snapshot, StudyStatus};
use evidentia_store::RegistryStore;
use serde::Serialize;
use std::collections::HashMap;

/// Registry counts shown by `stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub studies: usize,
    pub claims: usize,
    pub links: usize,
    pub usages: usize,
    pub with_doi: usize,
    pub with_key_finding: usize,
    pub landmarks: usize,
    pub links_supporting: usize,
    pub links_contradicting: usize,
    pub links_mixed: usize,
    pub active: usize,
    pub superseded: usize,
    pub retracted: usize,
    pub removal_records: usize,
}

impl RegistryStats {
    /// Tally a snapshot.
    ///
    /// Link directions count the effective direction: the link's own when
    /// set, else the study's.
    pub fn compute(snapshot: &Snapshot) -> Self {
        let mut stats = RegistryStats {
            studies: snapshot.studies.len(),
            claims: snapshot.claims.len(),
            links: snapshot.study_claims.len(),
            usages: snapshot.evidence_usage.len(),
            removal_records: snapshot.removed_studies.len(),
            ..Self::default()
        };

        for study in &snapshot.studies {
            if study.doi.is_some() {
                stats.with_doi += 1;
            }
            if study
                .key_finding
                .as_deref()
                .is_some_and(|f| !f.trim().is_empty())
            {
                stats.with_key_finding += 1;
            }
            if study.landmark {
                stats.landmarks += 1;
            }
            match study.status {
                StudyStatus::Active => stats.active += 1,
                StudyStatus::Superseded => stats.superseded += 1,
                StudyStatus::Retracted => stats.retracted += 1,
            }
        }

        let own: HashMap<_, _> = snapshot
            .studies
            .iter()
            .map(|s| (&s.study_id, s.direction))
            .collect();
        for link in &snapshot.study_claims {
            let direction = link
                .direction
                .or_else(|| own.get(&link.study_id).copied());
            match direction {
                Some(Direction::Supports) => stats.links_supporting += 1,
                Some(Direction::Contradicts) => stats.links_contradicting += 1,
                Some(Direction::Mixed) => stats.links_mixed += 1,
                None => {}
            }
        }

        stats
    }
}

fn percent(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "0%".to_string();
    }
    format!("{:.0}%", part as f64 * 100.0 / whole as f64)
}

/// Execute the stats command.
pub fn execute_stats(store: &RegistryStore, ctx: &Context<'_>) -> Result<()> {
    let snapshot = load_existing(store)?;
    let stats = RegistryStats::compute(&snapshot);
    let formatter = ctx.formatter;

    if formatter.is_json() {
        println!("{}", formatter.json(&stats)?);
        return Ok(());
    }

    let n = stats.studies;
    let rows = vec![
        vec!["Studies".to_string(), n.to_string()],
        vec!["Claims".to_string(), stats.claims.to_string()],
        vec!["Study-claim links".to_string(), stats.links.to_string()],
        vec!["Evidence usages".to_string(), stats.usages.to_string()],
        vec![
            "With DOI".to_string(),
            format!("{} ({})", stats.with_doi, percent(stats.with_doi, n)),
        ],
        vec![
            "With key finding".to_string(),
            format!(
                "{} ({})",
                stats.with_key_finding,
                percent(stats.with_key_finding, n)
            ),
        ],
        vec!["Landmarks".to_string(), stats.landmarks.to_string()],
        vec![
            "Links + / − / ±".to_string(),
            format!(
                "{} / {} / {}",
                stats.links_supporting, stats.links_contradicting, stats.links_mixed
            ),
        ],
        vec![
            "Active / superseded / retracted".to_string(),
            format!(
                "{} / {} / {}",
                stats.active, stats.superseded, stats.retracted
            ),
        ],
        vec![
            "Removal records".to_string(),
            stats.removal_records.to_string(),
        ],
    ];

    println!("{}", formatter.heading(&format!("Registry at {}", store.path().display())));
    println!("{}", formatter.table(&["Metric", "Value"], rows, "Empty registry."));
    Ok(())
}
