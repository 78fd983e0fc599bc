//! OpenAI-compatible chat-completions backend, used for Groq and OpenRouter.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::provider::{Generation, Provider, ProviderError};

pub const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const GROQ_MODEL: &str = "llama3-8b-8192";
pub const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const OPENROUTER_MODEL: &str = "mistralai/mistral-7b-instruct:free";

/// A provider speaking the `/chat/completions` request shape.
pub struct ChatCompletionsProvider {
    name: String,
    endpoint: String,
    model: String,
    temperature: f64,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    total_tokens: u32,
}

impl ChatCompletionsProvider {
    /// A blank key counts as no key.
    pub fn new(
        name: &str,
        endpoint: &str,
        model: &str,
        temperature: f64,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .build()
            .unwrap_or_else(|e| {
                warn!(
                    provider = name,
                    error = %e,
                    "HTTP client setup failed, using defaults without timeouts"
                );
                reqwest::Client::new()
            });

        Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            temperature,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        }
    }

    /// Groq: fast inference, low temperature for consistent analysis.
    pub fn groq(api_key: Option<String>, timeout: Duration) -> Self {
        Self::new("groq", GROQ_ENDPOINT, GROQ_MODEL, 0.3, api_key, timeout)
    }

    pub fn openrouter(api_key: Option<String>, timeout: Duration) -> Self {
        Self::new(
            "openrouter",
            OPENROUTER_ENDPOINT,
            OPENROUTER_MODEL,
            0.7,
            api_key,
            timeout,
        )
    }

    /// Point the provider at a different endpoint (self-hosted proxies, tests).
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

#[async_trait]
impl Provider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<Generation, ProviderError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(ProviderError::MissingCredentials(self.name.clone()));
        };

        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature: self.temperature,
        };

        debug!(provider = %self.name, model = %self.model, max_tokens, "chat completion request");
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(key)
            .json(&request)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::Decode("response has no message content".into()))?;

        Ok(Generation {
            content,
            tokens_used: body.usage.map(|u| u.total_tokens).unwrap_or(0),
        })
    }
}
