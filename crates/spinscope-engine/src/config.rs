//! Engine configuration, populated by callers (the CLI fills it from flags
//! and environment variables).

use std::path::PathBuf;
use std::time::Duration;

use spinscope_core::Thresholds;
use spinscope_llm::chat::{GROQ_ENDPOINT, OPENROUTER_ENDPOINT};
use spinscope_llm::gateway::DEFAULT_TIMEOUT;
use spinscope_llm::prompt::ANALYSIS_MAX_TOKENS;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub groq_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub groq_endpoint: String,
    pub openrouter_endpoint: String,
    /// Hard limit on each provider call.
    pub provider_timeout: Duration,
    pub max_tokens: u32,
    /// Register the offline provider as the last resort.
    pub local_provider: bool,
    pub thresholds: Thresholds,
    /// Directory with `model.onnx` and `tokenizer.json` for sentiment scoring.
    pub sentiment_model_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            openrouter_api_key: None,
            groq_endpoint: GROQ_ENDPOINT.to_string(),
            openrouter_endpoint: OPENROUTER_ENDPOINT.to_string(),
            provider_timeout: DEFAULT_TIMEOUT,
            max_tokens: ANALYSIS_MAX_TOKENS,
            local_provider: true,
            thresholds: Thresholds::default(),
            sentiment_model_dir: None,
        }
    }
}
