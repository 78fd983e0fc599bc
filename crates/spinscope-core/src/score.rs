//! Score composition: sub-scores, combination bonus, overall score and risk tier.
//!
//! Every sub-score is a capped diminishing-returns sum over per-category
//! match counts:
//!
//! ```text
//! weighted = weight * n * decay^(n - 1),   n = min(count, 3)
//! ```
//!
//! Emotional intensity decays at 0.8 per extra occurrence, urgency at 0.9.
//! Sub-scores are combined with fixed weights into an overall score in
//! `[0, 100]` and bucketed into a risk tier by a threshold pair.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::evidence::EmotionalTriggers;
use crate::lexicon::{
    ABSOLUTE, EMOTIONAL_HIGH, EMOTIONAL_MEDIUM, EMOTIONAL_SUBTLE, FEAR_TRIGGERS, LEAN_LEFT,
    LEAN_RIGHT, LOADED, URGENCY_HIGH, URGENCY_MEDIUM, URGENCY_SUBTLE, technique_key,
};
use crate::signals::SignalBundle;
use crate::types::{RiskLevel, ScoreRecord, TechniqueFinding};

pub const EMOTIONAL_DECAY: f64 = 0.8;
pub const URGENCY_DECAY: f64 = 0.9;
/// Occurrences beyond this add nothing.
pub const OCCURRENCE_CAP: usize = 3;

const EMOTIONAL_WEIGHTS: &[(&str, f64)] = &[
    (EMOTIONAL_HIGH, 25.0),
    (EMOTIONAL_MEDIUM, 15.0),
    (EMOTIONAL_SUBTLE, 8.0),
    (URGENCY_HIGH, 20.0),
    (URGENCY_MEDIUM, 12.0),
    (URGENCY_SUBTLE, 5.0),
    (FEAR_TRIGGERS, 18.0),
    (LOADED, 15.0),
    (ABSOLUTE, 10.0),
];

const URGENCY_WEIGHTS: &[(&str, f64)] = &[
    (URGENCY_HIGH, 25.0),
    (URGENCY_MEDIUM, 15.0),
    (URGENCY_SUBTLE, 8.0),
];

/// Categories whose distinct matches seed the keyword base intensity.
const BASE_INTENSITY_CATEGORIES: &[&str] = &[EMOTIONAL_HIGH, EMOTIONAL_MEDIUM, URGENCY_HIGH];
const BASE_INTENSITY_STEP: f64 = 15.0;

const TECHNIQUE_SEVERITY: &[(&str, f64)] = &[
    ("fear_mongering", 15.0),
    ("conspiracy_theory", 12.0),
    ("loaded_language", 10.0),
    ("us_vs_them", 10.0),
    ("call_to_action", 8.0),
    ("strawman", 8.0),
    ("bandwagon", 7.0),
    ("appeal_to_authority", 6.0),
];
const DEFAULT_SEVERITY: f64 = 5.0;

struct Combo {
    techniques: &'static [&'static str],
    bonus: f64,
    rationale: &'static str,
}

/// Technique pairs known to be especially manipulative together.
const COMBINATIONS: &[Combo] = &[
    Combo {
        techniques: &["fear_mongering", "call_to_action"],
        bonus: 20.0,
        rationale: "Fear + urgent action = classic manipulation",
    },
    Combo {
        techniques: &["conspiracy_theory", "us_vs_them"],
        bonus: 18.0,
        rationale: "Conspiracy + division = radicalization pattern",
    },
    Combo {
        techniques: &["loaded_language", "bandwagon"],
        bonus: 15.0,
        rationale: "Emotional language + peer pressure",
    },
    Combo {
        techniques: &["fear_mongering", "conspiracy_theory"],
        bonus: 25.0,
        rationale: "Fear + conspiracy = dangerous misinformation",
    },
    Combo {
        techniques: &["call_to_action", "urgency"],
        bonus: 12.0,
        rationale: "Pressure tactics combination",
    },
];

/// Name added to the detected set whenever urgency markers are present.
const URGENCY_TAG: &str = "urgency";
const TRIGGER_DIVERSITY_MIN_GROUPS: usize = 3;
const TRIGGER_DIVERSITY_BONUS: f64 = 10.0;
pub const MAX_COMBINATION_BONUS: f64 = 40.0;

const W_EMOTIONAL: f64 = 0.25;
const W_BIAS: f64 = 0.15;
const W_URGENCY: f64 = 0.20;
const W_PROPAGANDA: f64 = 0.25;
const W_COMBINATION: f64 = 0.15;

// ── Thresholds ──

/// Risk tier boundaries: `score < low` is low, `low <= score < medium` is
/// medium, anything else is high.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub low: f64,
    pub medium: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: 34.0,
            medium: 67.0,
        }
    }
}

impl Thresholds {
    /// Accept a pair only if it is a strictly increasing two-point partition.
    pub fn new(low: f64, medium: f64) -> Option<Self> {
        let t = Self { low, medium };
        t.is_valid().then_some(t)
    }

    pub fn is_valid(&self) -> bool {
        self.low.is_finite() && self.medium.is_finite() && self.low < self.medium
    }

    /// Use `requested` when well-formed, otherwise fall back to `self`.
    pub fn with_override(&self, requested: Option<Thresholds>) -> Thresholds {
        match requested {
            Some(t) if t.is_valid() => t,
            Some(t) => {
                warn!(low = t.low, medium = t.medium, "ignoring malformed thresholds");
                *self
            }
            None => *self,
        }
    }

    pub fn risk_level(&self, score: f64) -> RiskLevel {
        if score < self.low {
            RiskLevel::Low
        } else if score < self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

// ── Sub-scores ──

/// Capped diminishing-returns contribution of one category.
pub fn weighted(weight: f64, count: usize, decay: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let n = count.min(OCCURRENCE_CAP);
    weight * n as f64 * decay.powi(n as i32 - 1)
}

/// Base intensity used when no sentiment model is available.
pub fn keyword_base_intensity(bundle: &SignalBundle) -> f64 {
    let distinct: usize = BASE_INTENSITY_CATEGORIES
        .iter()
        .map(|c| bundle.distinct_keywords(c).len())
        .sum();
    (distinct as f64 * BASE_INTENSITY_STEP).min(100.0)
}

/// Base intensity plus weighted keyword contributions, in `[0, 100]`.
pub fn emotional_intensity(bundle: &SignalBundle, base: f64) -> f64 {
    let keyword_score: f64 = EMOTIONAL_WEIGHTS
        .iter()
        .map(|&(category, weight)| weighted(weight, bundle.count(category), EMOTIONAL_DECAY))
        .sum();
    round2(bounded(bounded(base, 0.0, 100.0) + keyword_score, 0.0, 100.0))
}

pub fn urgency_score(bundle: &SignalBundle) -> f64 {
    let score: f64 = URGENCY_WEIGHTS
        .iter()
        .map(|&(category, weight)| weighted(weight, bundle.count(category), URGENCY_DECAY))
        .sum();
    bounded(score, 0.0, 100.0)
}

/// Lean balance in `[-100, 100]`; negative leans left, positive right.
pub fn ideological_bias(bundle: &SignalBundle) -> f64 {
    let left = bundle.count(LEAN_LEFT) as f64;
    let right = bundle.count(LEAN_RIGHT) as f64;
    if left + right == 0.0 {
        return 0.0;
    }
    round2((right - left) / (left + right) * 100.0)
}

pub fn severity(technique: &str) -> f64 {
    let key = technique_key(technique);
    TECHNIQUE_SEVERITY
        .iter()
        .find(|(name, _)| *name == key)
        .map(|&(_, w)| w)
        .unwrap_or(DEFAULT_SEVERITY)
}

/// Multiplier for technique variety. Five or more distinct techniques take
/// the stronger multiplier; the two brackets never stack.
pub fn diversity_multiplier(distinct_techniques: usize) -> f64 {
    if distinct_techniques >= 5 {
        1.4
    } else if distinct_techniques >= 3 {
        1.2
    } else {
        1.0
    }
}

/// Severity-weighted technique score in `[0, 100]`.
pub fn propaganda_risk(findings: &[TechniqueFinding]) -> f64 {
    if findings.is_empty() {
        return 0.0;
    }

    let sum: f64 = findings
        .iter()
        .map(|f| severity(&f.technique) * TechniqueFinding::clamp_confidence(f.confidence))
        .sum();
    let distinct: BTreeSet<String> = findings.iter().map(|f| technique_key(&f.technique)).collect();

    bounded(sum * diversity_multiplier(distinct.len()), 0.0, 100.0)
}

// ── Combination bonus ──

/// A combination table entry that fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboAward {
    pub techniques: Vec<String>,
    pub bonus: f64,
    pub rationale: String,
}

/// Bonus for co-occurring techniques and multi-vector emotional pressure,
/// in `[0, 40]`, with the entries that fired.
pub fn combination_bonus(
    findings: &[TechniqueFinding],
    triggers: &EmotionalTriggers,
) -> (f64, Vec<ComboAward>) {
    if findings.is_empty() {
        return (0.0, Vec::new());
    }

    let mut detected: Vec<String> = findings.iter().map(|f| technique_key(&f.technique)).collect();
    if !triggers.urgency_markers.is_empty() {
        detected.push(URGENCY_TAG.to_string());
    }

    let mut total = 0.0;
    let mut awards = Vec::new();

    for combo in COMBINATIONS {
        let fired = combo
            .techniques
            .iter()
            .all(|wanted| detected.iter().any(|name| name.contains(wanted)));
        if fired {
            total += combo.bonus;
            awards.push(ComboAward {
                techniques: combo.techniques.iter().map(|t| t.to_string()).collect(),
                bonus: combo.bonus,
                rationale: combo.rationale.to_string(),
            });
        }
    }

    if triggers.active_groups() >= TRIGGER_DIVERSITY_MIN_GROUPS {
        total += TRIGGER_DIVERSITY_BONUS;
        awards.push(ComboAward {
            techniques: vec!["emotional_triggers".to_string()],
            bonus: TRIGGER_DIVERSITY_BONUS,
            rationale: "Multi-vector emotional manipulation".to_string(),
        });
    }

    (bounded(total, 0.0, MAX_COMBINATION_BONUS), awards)
}

// ── Overall ──

/// Weighted sum of sub-scores, clamped to `[0, 100]` and rounded to 2 dp.
pub fn overall_score(
    emotional: f64,
    bias: f64,
    urgency: f64,
    propaganda: f64,
    combination: f64,
) -> f64 {
    let raw = W_EMOTIONAL * bounded(emotional, 0.0, 100.0)
        + W_BIAS * bounded(bias, -100.0, 100.0).abs()
        + W_URGENCY * bounded(urgency, 0.0, 100.0)
        + W_PROPAGANDA * bounded(propaganda, 0.0, 100.0)
        + W_COMBINATION * bounded(combination, 0.0, MAX_COMBINATION_BONUS);
    round2(bounded(raw, 0.0, 100.0))
}

/// Score record plus the combination entries that produced its bonus.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeScore {
    pub record: ScoreRecord,
    pub combinations: Vec<ComboAward>,
}

/// Assemble a score record from sub-scores and evidence.
///
/// Inputs are clamped into their intervals first, so provider-supplied
/// values cannot push the record out of bounds.
pub fn compose(
    emotional: f64,
    urgency: f64,
    bias: f64,
    findings: &[TechniqueFinding],
    triggers: &EmotionalTriggers,
    thresholds: &Thresholds,
) -> CompositeScore {
    let emotional_intensity = round2(bounded(emotional, 0.0, 100.0));
    let urgency_score = bounded(urgency, 0.0, 100.0);
    let ideological_bias = round2(bounded(bias, -100.0, 100.0));
    let propaganda_risk = propaganda_risk(findings);
    let (combination_bonus, combinations) = combination_bonus(findings, triggers);

    let overall_score = overall_score(
        emotional_intensity,
        ideological_bias,
        urgency_score,
        propaganda_risk,
        combination_bonus,
    );

    CompositeScore {
        record: ScoreRecord {
            emotional_intensity,
            urgency_score,
            ideological_bias,
            propaganda_risk,
            combination_bonus,
            overall_score,
            risk_level: thresholds.risk_level(overall_score),
        },
        combinations,
    }
}

/// Clamp that maps NaN to the lower bound.
fn bounded(x: f64, lo: f64, hi: f64) -> f64 {
    if x.is_nan() { lo } else { x.clamp(lo, hi) }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
