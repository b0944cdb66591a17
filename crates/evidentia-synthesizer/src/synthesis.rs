//! Per-claim aggregation: net direction, confidence tier, gap flag

use evidentia_domain::{ClaimId, Direction, LinkedStudy, Snapshot};
use serde::Serialize;
use std::fmt;

/// Top score at or above which a claim's evidence is `Strong`
pub const STRONG_THRESHOLD: f64 = 12.0;

/// Top score at or above which a claim's evidence is `Moderate`
pub const MODERATE_THRESHOLD: f64 = 10.0;

/// Marker for an empty direction partition
pub const NONE_MARKER: &str = "—";

/// Coarse confidence label derived from the best study behind a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Confidence {
    /// Top score below 10
    Limited,
    /// Top score in [10, 12)
    Moderate,
    /// Top score 12 or more
    Strong,
}

impl Confidence {
    /// Tier for a top final score
    pub fn from_top_score(top: f64) -> Self {
        if top >= STRONG_THRESHOLD {
            Confidence::Strong
        } else if top >= MODERATE_THRESHOLD {
            Confidence::Moderate
        } else {
            Confidence::Limited
        }
    }

    /// Label as shown in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Strong => "Strong",
            Confidence::Moderate => "Moderate",
            Confidence::Limited => "Limited",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Net verdict for a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetDirection {
    /// Evidence all points one way (or is all mixed)
    Clear(Direction),
    /// Support and contradiction coexist; the side with the stronger top
    /// study wins
    Contested(Direction),
}

impl NetDirection {
    /// The winning direction
    pub fn direction(&self) -> Direction {
        match self {
            NetDirection::Clear(d) | NetDirection::Contested(d) => *d,
        }
    }

    /// Whether the verdict is contested
    pub fn is_contested(&self) -> bool {
        matches!(self, NetDirection::Contested(_))
    }
}

impl fmt::Display for NetDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetDirection::Clear(d) => write!(f, "{}", d),
            NetDirection::Contested(d) => write!(f, "{} (contested)", d),
        }
    }
}

/// Evidence gap flagged in the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gap {
    /// Only supporting evidence so far
    NeedContradicting,
    /// Only contradicting evidence so far
    NeedSupporting,
}

impl Gap {
    /// Label as shown in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Gap::NeedContradicting => "Need contradicting study",
            Gap::NeedSupporting => "Need supporting study",
        }
    }
}

/// Synthesized view of one claim
///
/// Each partition is sorted by final score, highest first; equal scores keep
/// the order the studies were added to the registry.
#[derive(Debug, Clone)]
pub struct ClaimSynthesis<'a> {
    /// The claim
    pub claim_id: ClaimId,
    /// Supporting studies
    pub plus: Vec<LinkedStudy<'a>>,
    /// Contradicting studies
    pub minus: Vec<LinkedStudy<'a>>,
    /// Mixed/conditional studies
    pub mixed: Vec<LinkedStudy<'a>>,
    /// Net verdict
    pub net: NetDirection,
    /// Confidence tier
    pub confidence: Confidence,
    /// Gap flag, if any
    pub gap: Option<Gap>,
}

fn top_score(partition: &[LinkedStudy<'_>]) -> f64 {
    partition.first().map(|l| l.study.final_score()).unwrap_or(0.0)
}

fn best_label(partition: &[LinkedStudy<'_>]) -> String {
    partition
        .first()
        .map(|l| l.study.short_label())
        .unwrap_or_else(|| NONE_MARKER.to_string())
}

impl<'a> ClaimSynthesis<'a> {
    /// Synthesize from the linked studies of a claim
    ///
    /// Returns `None` when no study is linked.
    pub fn from_linked(claim_id: ClaimId, linked: Vec<LinkedStudy<'a>>) -> Option<Self> {
        if linked.is_empty() {
            return None;
        }

        let top = linked
            .iter()
            .map(|l| l.study.final_score())
            .fold(f64::NEG_INFINITY, f64::max);

        let mut plus = Vec::new();
        let mut minus = Vec::new();
        let mut mixed = Vec::new();
        for l in ranked(linked) {
            match l.direction {
                Direction::Supports => plus.push(l),
                Direction::Contradicts => minus.push(l),
                Direction::Mixed => mixed.push(l),
            }
        }

        let net = match (plus.is_empty(), minus.is_empty(), mixed.is_empty()) {
            (false, true, true) => NetDirection::Clear(Direction::Supports),
            (true, false, _) => NetDirection::Clear(Direction::Contradicts),
            (true, true, false) => NetDirection::Clear(Direction::Mixed),
            _ if top_score(&plus) >= top_score(&minus) => {
                NetDirection::Contested(Direction::Supports)
            }
            _ => NetDirection::Contested(Direction::Contradicts),
        };

        let gap = if !plus.is_empty() && minus.is_empty() && mixed.is_empty() {
            Some(Gap::NeedContradicting)
        } else if !minus.is_empty() && plus.is_empty() {
            Some(Gap::NeedSupporting)
        } else {
            None
        };

        Some(Self {
            claim_id,
            plus,
            minus,
            mixed,
            net,
            confidence: Confidence::from_top_score(top),
            gap,
        })
    }

    /// Best supporting study as `"<authors> <year> (<score>)"`, or `—`
    pub fn best_plus(&self) -> String {
        best_label(&self.plus)
    }

    /// Best contradicting study as `"<authors> <year> (<score>)"`, or `—`
    pub fn best_minus(&self) -> String {
        best_label(&self.minus)
    }

    /// Number of linked studies
    pub fn total(&self) -> usize {
        self.plus.len() + self.minus.len() + self.mixed.len()
    }

    /// Flat, owned row for tables and JSON output
    pub fn to_row(&self) -> SummaryRow {
        SummaryRow {
            claim: self.claim_id.to_string(),
            n_plus: self.plus.len(),
            n_minus: self.minus.len(),
            n_mixed: self.mixed.len(),
            best_plus: self.best_plus(),
            best_minus: self.best_minus(),
            net: self.net.to_string(),
            confidence: self.confidence,
            gap: self.gap.map(|g| g.as_str().to_string()).unwrap_or_default(),
        }
    }
}

/// One line of the claim summary index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Claim id
    pub claim: String,
    /// Supporting studies
    pub n_plus: usize,
    /// Contradicting studies
    pub n_minus: usize,
    /// Mixed studies
    pub n_mixed: usize,
    /// Best supporting study label
    pub best_plus: String,
    /// Best contradicting study label
    pub best_minus: String,
    /// Net verdict
    pub net: String,
    /// Confidence tier
    pub confidence: Confidence,
    /// Gap flag, empty when none
    pub gap: String,
}

/// Sort by final score descending, keeping insertion order for ties
pub fn ranked(mut linked: Vec<LinkedStudy<'_>>) -> Vec<LinkedStudy<'_>> {
    linked.sort_by(|a, b| b.study.final_score().total_cmp(&a.study.final_score()));
    linked
}

/// Studies linked to a claim, best first, optionally of one direction
pub fn ranked_studies<'a>(
    snapshot: &'a Snapshot,
    claim_id: &ClaimId,
    direction: Option<Direction>,
) -> Vec<LinkedStudy<'a>> {
    let mut linked = snapshot.linked_studies(claim_id);
    if let Some(direction) = direction {
        linked.retain(|l| l.direction == direction);
    }
    ranked(linked)
}

/// Synthesize one claim; `None` when nothing is linked to it
pub fn synthesize<'a>(snapshot: &'a Snapshot, claim_id: &ClaimId) -> Option<ClaimSynthesis<'a>> {
    ClaimSynthesis::from_linked(claim_id.clone(), snapshot.linked_studies(claim_id))
}

/// Synthesize every claim that has evidence, sorted by claim id
pub fn summarize(snapshot: &Snapshot) -> Vec<ClaimSynthesis<'_>> {
    let mut claim_ids: Vec<&ClaimId> = snapshot.claims.iter().map(|c| &c.claim_id).collect();
    claim_ids.sort();
    claim_ids.dedup();

    claim_ids
        .into_iter()
        .filter_map(|id| synthesize(snapshot, id))
        .collect()
}
