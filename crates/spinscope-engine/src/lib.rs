//! Analysis orchestration over the scoring core and the provider gateway.

pub mod compare;
pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;

pub use compare::{
    BiasEntry, ComparisonInsights, ComparisonReport, EmotionalEntry, KeyDifference,
    LabelledResult, RiskEntry, SharedTechnique, TechniqueEntry, compare,
};
pub use config::EngineConfig;
pub use context::AnalysisContext;
pub use error::{AnalysisError, ErrorReport};
pub use orchestrator::{AnalyzeOptions, analyze};
