//! Everything an analysis needs, built once and shared by reference.

use std::sync::Arc;

use spinscope_ai::SentimentModel;
use spinscope_core::{Lexicon, Thresholds};
use spinscope_llm::{ChatCompletionsProvider, Gateway, LocalProvider, Provider};
use tracing::{info, warn};

use crate::config::EngineConfig;

pub struct AnalysisContext {
    pub lexicon: &'static Lexicon,
    pub gateway: Gateway,
    pub thresholds: Thresholds,
    pub sentiment: Option<Arc<dyn SentimentModel>>,
    pub max_tokens: u32,
}

impl AnalysisContext {
    /// Built-in lexicon, default thresholds, no sentiment model.
    pub fn new(gateway: Gateway) -> Self {
        let defaults = EngineConfig::default();
        Self {
            lexicon: Lexicon::builtin(),
            gateway,
            thresholds: defaults.thresholds,
            sentiment: None,
            max_tokens: defaults.max_tokens,
        }
    }

    /// Provider list in priority order: Groq, OpenRouter, then the offline
    /// provider when enabled.
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut providers: Vec<Box<dyn Provider>> = vec![
            Box::new(
                ChatCompletionsProvider::groq(config.groq_api_key.clone(), config.provider_timeout)
                    .with_endpoint(&config.groq_endpoint),
            ),
            Box::new(
                ChatCompletionsProvider::openrouter(
                    config.openrouter_api_key.clone(),
                    config.provider_timeout,
                )
                .with_endpoint(&config.openrouter_endpoint),
            ),
        ];
        if config.local_provider {
            providers.push(Box::new(LocalProvider::new()));
        }

        let gateway = Gateway::new(providers, config.provider_timeout);
        let health = gateway.health();
        info!(
            available = health.available_providers,
            status = health.status.as_str(),
            "provider gateway ready"
        );

        let thresholds = if config.thresholds.is_valid() {
            config.thresholds
        } else {
            warn!(
                low = config.thresholds.low,
                medium = config.thresholds.medium,
                "configured thresholds malformed, using defaults"
            );
            Thresholds::default()
        };

        Self {
            lexicon: Lexicon::builtin(),
            gateway,
            thresholds,
            sentiment: load_sentiment(config),
            max_tokens: config.max_tokens,
        }
    }

    pub fn with_sentiment(mut self, model: Arc<dyn SentimentModel>) -> Self {
        self.sentiment = Some(model);
        self
    }
}

#[cfg(feature = "onnx")]
fn load_sentiment(config: &EngineConfig) -> Option<Arc<dyn SentimentModel>> {
    let dir = config.sentiment_model_dir.as_deref()?;
    match spinscope_ai::OnnxSentiment::load(dir) {
        Ok(model) => Some(Arc::new(model)),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "sentiment model unavailable, using keyword base");
            None
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn load_sentiment(config: &EngineConfig) -> Option<Arc<dyn SentimentModel>> {
    if let Some(dir) = &config.sentiment_model_dir {
        warn!(
            dir = %dir.display(),
            "built without the `onnx` feature, ignoring sentiment model"
        );
    }
    None
}
