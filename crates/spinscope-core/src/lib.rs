//! Core types, the keyword lexicon, signal extraction, and deterministic risk scoring.

pub mod error;
pub mod evidence;
pub mod lexicon;
pub mod score;
pub mod signals;
pub mod text;
pub mod types;

pub use error::CoreError;
pub use evidence::{EmotionalTriggers, Trigger, detect_techniques, emotional_triggers};
pub use lexicon::{Category, Group, Lexicon, Tier};
pub use score::{
    ComboAward, CompositeScore, Thresholds, combination_bonus, compose, emotional_intensity,
    ideological_bias, keyword_base_intensity, overall_score, propaganda_risk, urgency_score,
};
pub use signals::{SignalBundle, extract, find_positions};
pub use types::{
    AnalysisResult, Entity, ExternalDetail, LanguageStats, Match, Provenance, ReadingLevel,
    RiskLevel, ScoreRecord, SignalSummary, Span, TechniqueFinding,
};
