//! Stricter gap report: claims that need more studies

use crate::{ClaimSynthesis, Confidence};
use serde::Serialize;

/// Supporting studies a claim should have before it stops being a gap
pub const MIN_SUPPORTING: usize = 2;

/// A claim with thin evidence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapEntry {
    /// Claim id
    pub claim: String,
    /// Supporting studies
    pub n_plus: usize,
    /// Contradicting studies
    pub n_minus: usize,
    /// Confidence tier
    pub confidence: Confidence,
    /// What is missing, e.g. `Need 1 more supporting`
    pub gaps: Vec<String>,
}

impl GapEntry {
    /// Gaps joined with `"; "`
    pub fn describe(&self) -> String {
        self.gaps.join("; ")
    }
}

/// Gap report over a set of synthesized claims
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GapReport {
    /// Claims with gaps, in the order given
    pub entries: Vec<GapEntry>,
    /// Claims considered
    pub total_claims: usize,
}

/// Flag claims with fewer than two supporting studies or no contradicting one
pub fn gap_report(summary: &[ClaimSynthesis<'_>]) -> GapReport {
    let entries = summary
        .iter()
        .filter_map(|s| {
            let n_plus = s.plus.len();
            let n_minus = s.minus.len();
            if n_plus >= MIN_SUPPORTING && n_minus > 0 {
                return None;
            }

            let mut gaps = Vec::new();
            if n_plus < MIN_SUPPORTING {
                gaps.push(format!("Need {} more supporting", MIN_SUPPORTING - n_plus));
            }
            if n_minus == 0 && n_plus > 0 {
                gaps.push("Need contradicting study".to_string());
            }

            Some(GapEntry {
                claim: s.claim_id.to_string(),
                n_plus,
                n_minus,
                confidence: s.confidence,
                gaps,
            })
        })
        .collect();

    GapReport {
        entries,
        total_claims: summary.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarize;
    use evidentia_domain::{ClaimId, Direction, Relevance, Score, Snapshot, Study, StudyId};

    fn snapshot(links: &[(&str, &str, Direction)]) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for (i, (claim, id, dir)) in links.iter().enumerate() {
            let study_id = StudyId::new(format!("{}-{}", id, i));
            snapshot
                .insert_study(Study::new(
                    study_id.clone(),
                    *id,
                    2020,
                    Score::new(10.0, Relevance::Full).unwrap(),
                    *dir,
                ))
                .unwrap();
            let claim = ClaimId::parse(claim).unwrap();
            snapshot.ensure_claim(claim.clone(), None);
            snapshot.link(&study_id, &claim, None).unwrap();
        }
        snapshot
    }

    #[test]
    fn test_gap_annotations() {
        let snapshot = snapshot(&[
            ("a→y", "A", Direction::Supports),
            ("b→y", "B", Direction::Supports),
            ("b→y", "C", Direction::Supports),
            ("c→y", "D", Direction::Supports),
            ("c→y", "E", Direction::Supports),
            ("c→y", "F", Direction::Contradicts),
            ("d→y", "G", Direction::Contradicts),
        ]);
        let summary = summarize(&snapshot);
        let report = gap_report(&summary);

        assert_eq!(report.total_claims, 4);
        let described: Vec<(String, String)> = report
            .entries
            .iter()
            .map(|e| (e.claim.clone(), e.describe()))
            .collect();
        assert_eq!(
            described,
            [
                ("a→y".to_string(), "Need 1 more supporting; Need contradicting study".to_string()),
                ("b→y".to_string(), "Need contradicting study".to_string()),
                ("d→y".to_string(), "Need 2 more supporting".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_summary_has_no_gaps() {
        let report = gap_report(&[]);
        assert!(report.entries.is_empty());
        assert_eq!(report.total_claims, 0);
    }
}
