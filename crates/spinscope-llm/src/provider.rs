//! The provider seam: one trait per backend, one envelope for callers.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("no API key configured for {0}")]
    MissingCredentials(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed provider response: {0}")]
    Decode(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Text produced by a successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub content: String,
    pub tokens_used: u32,
}

/// A text-generation backend.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    /// Whether the backend can be called at all (e.g. credentials present).
    fn is_available(&self) -> bool;

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<Generation, ProviderError>;
}

/// Normalized outcome of a gateway call, success or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub tokens_used: u32,
}

impl ProviderResponse {
    pub fn succeeded(provider: &dyn Provider, generation: Generation) -> Self {
        Self {
            content: generation.content,
            provider: provider.name().to_string(),
            model: provider.model().to_string(),
            success: true,
            error: None,
            tokens_used: generation.tokens_used,
        }
    }

    /// Failure envelope with empty content.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            provider: String::new(),
            model: String::new(),
            success: false,
            error: Some(error.into()),
            tokens_used: 0,
        }
    }
}
