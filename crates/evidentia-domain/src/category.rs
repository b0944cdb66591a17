//! Content categories, keyed by claim exposure

use crate::ClaimId;
use std::collections::{BTreeMap, HashMap};

/// Category reported for exposures that no group lists
pub const OTHER_CATEGORY: &str = "other";

const DEFAULT_GROUPS: &[(&str, &[&str])] = &[
    (
        "sleep",
        &[
            "sleep-duration",
            "sleep-regularity",
            "sleep-quality",
            "insomnia",
            "long-sleep",
            "social-jet-lag",
            "catch-up-sleep",
            "wearable",
            "caffeine",
            "temperature",
            "light-therapy",
            "warm-bath",
            "CBT-I",
            "magnesium",
            "ashwagandha",
            "glycine",
            "melatonin",
            "sleep-debt",
        ],
    ),
    (
        "nutrition",
        &[
            "diet-quality",
            "fruit-veg",
            "UPF",
            "mediterranean",
            "saturated-fat",
            "sodium",
            "alcohol",
            "centenarian-diet",
            "flexible-dieting",
            "eating-speed",
            "food-tracking",
            "meal-timing",
        ],
    ),
    (
        "protein",
        &[
            "protein",
            "protein-source",
            "protein-dose",
            "protein-distribution",
            "protein-deficit",
            "protein-timing",
            "amino-acids",
        ],
    ),
    ("vo2max", &["CRF", "HIIT", "exercise-dose", "PA", "VO2max-estimation"]),
    (
        "muscle-strength",
        &["muscle-strength", "resistance-training", "push-ups", "chair-stand"],
    ),
    (
        "mindset",
        &["motivation", "grit", "locus-of-control", "growth-mindset", "mHealth", "habit"],
    ),
    (
        "wellbeing",
        &[
            "positive-affect",
            "flow",
            "social-connection",
            "purpose",
            "goal-pursuit",
            "stress-mindset",
            "emotion-regulation",
            "meditation",
            "nature",
            "gratitude",
            "PERMA",
        ],
    ),
];

/// Maps a claim's exposure to the content category it belongs to
///
/// Lookup is by exact exposure string; anything unlisted is [`OTHER_CATEGORY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
    by_exposure: HashMap<String, String>,
}

impl Default for CategoryMap {
    fn default() -> Self {
        let mut map = Self::empty();
        for (category, exposures) in DEFAULT_GROUPS {
            for exposure in *exposures {
                map.by_exposure.insert(exposure.to_string(), category.to_string());
            }
        }
        map
    }
}

impl CategoryMap {
    /// A map with no groups; every exposure is "other"
    pub fn empty() -> Self {
        Self {
            by_exposure: HashMap::new(),
        }
    }

    /// Add or override groups of `category → [exposure, ...]`
    pub fn extend(&mut self, groups: &BTreeMap<String, Vec<String>>) {
        for (category, exposures) in groups {
            for exposure in exposures {
                self.by_exposure.insert(exposure.clone(), category.clone());
            }
        }
    }

    /// Category of a claim
    pub fn category_of(&self, claim_id: &ClaimId) -> &str {
        self.by_exposure
            .get(claim_id.exposure())
            .map(String::as_str)
            .unwrap_or(OTHER_CATEGORY)
    }

    /// Whether `claim_id` belongs to `category`
    pub fn contains(&self, category: &str, claim_id: &ClaimId) -> bool {
        self.category_of(claim_id) == category
    }
}
