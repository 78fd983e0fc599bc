//! Result types shared by the scoring engine, the orchestrator and callers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evidence::EmotionalTriggers;
use crate::score::ComboAward;

/// Byte range into the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// One occurrence of a lexicon keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub keyword: String,
    pub category: String,
    pub start: usize,
    pub end: usize,
}

impl Match {
    pub fn span(&self) -> Span {
        Span {
            start: self.start,
            end: self.end,
        }
    }
}

/// A detected persuasion technique with its evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueFinding {
    pub technique: String,
    /// Matched keyword (deterministic path) or provider-quoted evidence.
    pub evidence: String,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    pub positions: Vec<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psychological_impact: Option<String>,
}

impl TechniqueFinding {
    pub const DEFAULT_CONFIDENCE: f64 = 0.8;

    /// Clamp a confidence into `[0, 1]`; non-finite values take the default.
    pub fn clamp_confidence(raw: f64) -> f64 {
        if raw.is_finite() {
            raw.clamp(0.0, 1.0)
        } else {
            Self::DEFAULT_CONFIDENCE
        }
    }
}

/// Discrete risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Lenient parse of provider-supplied tiers. Unknown values are `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "moderate" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Bounded numeric outputs of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// `[0, 100]`
    pub emotional_intensity: f64,
    /// `[0, 100]`
    pub urgency_score: f64,
    /// `[-100, 100]`, positive leans right.
    pub ideological_bias: f64,
    /// `[0, 100]`
    pub propaganda_risk: f64,
    /// `[0, 40]`
    pub combination_bonus: f64,
    /// `[0, 100]`, rounded to two decimals.
    pub overall_score: f64,
    pub risk_level: RiskLevel,
}

/// Which path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    External,
    DeterministicFallback,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::External => "external",
            Self::DeterministicFallback => "deterministic-fallback",
        }
    }
}

/// A named entity mentioned in the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    /// Entity type, e.g. `PERSON`, `ORG`, or `MISC` for pattern matches.
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framing: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingLevel {
    Low,
    Medium,
    High,
}

impl ReadingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Surface statistics of the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageStats {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub reading_level: ReadingLevel,
    pub exclamation_count: usize,
    pub question_count: usize,
    pub caps_percentage: f64,
}

/// Condensed view of the signal bundle carried in a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSummary {
    /// Match count per lexicon category (every category present).
    pub category_counts: BTreeMap<String, usize>,
    /// Sentiment base before keyword weighting.
    pub base_intensity: f64,
    pub triggers: EmotionalTriggers,
    /// Combination table entries that fired.
    pub combinations: Vec<ComboAward>,
}

/// Provider-side details of an external analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDetail {
    pub provider: String,
    pub model: String,
    pub tokens_used: u32,
    /// Overall score as reported by the provider (not used for tiering).
    pub reported_overall: f64,
    pub reported_risk_level: String,
    /// Optional educational sections, passed through as JSON.
    pub sections: BTreeMap<String, serde_json::Value>,
}

/// Normalized output of one analysis, whichever path produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub scores: ScoreRecord,
    pub techniques: Vec<TechniqueFinding>,
    pub signals: SignalSummary,
    pub entities: Vec<Entity>,
    pub narrative: String,
    pub provenance: Provenance,
    pub language: LanguageStats,
    pub highlighted_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<ExternalDetail>,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    /// Distinct technique names in first-seen order.
    pub fn technique_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for finding in &self.techniques {
            if !names.contains(&finding.technique.as_str()) {
                names.push(&finding.technique);
            }
        }
        names
    }
}
