//! Priority-ordered provider fallback.
//!
//! The provider list is fixed at construction. Every call sweeps it from the
//! top, skipping unavailable providers, and returns the first success. Each
//! attempt is bounded by a hard timeout; a timeout counts as a provider
//! failure like any other.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::provider::{Provider, ProviderError, ProviderResponse};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Gateway {
    providers: Vec<Box<dyn Provider>>,
    timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub name: String,
    pub model: String,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub providers: Vec<ProviderStatus>,
    pub available_providers: usize,
    pub status: HealthStatus,
}

impl Gateway {
    pub fn new(providers: Vec<Box<dyn Provider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    pub fn providers(&self) -> impl Iterator<Item = &dyn Provider> {
        self.providers.iter().map(|p| p.as_ref())
    }

    /// Try each available provider in order until one succeeds.
    pub async fn generate_with_fallback(&self, prompt: &str, max_tokens: u32) -> ProviderResponse {
        let mut attempted = 0usize;

        for provider in self.providers.iter().filter(|p| p.is_available()) {
            attempted += 1;
            let started = Instant::now();

            let outcome =
                match tokio::time::timeout(self.timeout, provider.generate(prompt, max_tokens))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Timeout(self.timeout)),
                };

            match outcome {
                Ok(generation) => {
                    info!(
                        provider = provider.name(),
                        model = provider.model(),
                        tokens = generation.tokens_used,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "provider call succeeded"
                    );
                    return ProviderResponse::succeeded(provider.as_ref(), generation);
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "provider call failed, trying next");
                }
            }
        }

        if attempted == 0 {
            warn!("no text-generation providers available");
            ProviderResponse::failed("No providers available")
        } else {
            warn!(attempted, "all text-generation providers failed");
            ProviderResponse::failed("All providers failed")
        }
    }

    pub fn health(&self) -> HealthReport {
        let providers: Vec<ProviderStatus> = self
            .providers
            .iter()
            .map(|p| ProviderStatus {
                name: p.name().to_string(),
                model: p.model().to_string(),
                available: p.is_available(),
            })
            .collect();
        let available_providers = providers.iter().filter(|p| p.available).count();

        HealthReport {
            providers,
            available_providers,
            status: if available_providers > 0 {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::provider::Generation;

    enum Behaviour {
        Reply(&'static str),
        Fail,
        Hang,
    }

    struct Scripted {
        name: &'static str,
        available: bool,
        behaviour: Behaviour,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn boxed(
            name: &'static str,
            available: bool,
            behaviour: Behaviour,
        ) -> (Box<dyn Provider>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let provider = Self {
                name,
                available,
                behaviour,
                calls: calls.clone(),
            };
            (Box::new(provider), calls)
        }
    }

    #[async_trait]
    impl Provider for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        fn model(&self) -> &str {
            "scripted-1"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn generate(&self, _prompt: &str, _max: u32) -> Result<Generation, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Reply(text) => Ok(Generation {
                    content: text.to_string(),
                    tokens_used: 7,
                }),
                Behaviour::Fail => Err(ProviderError::Status {
                    status: 500,
                    body: "boom".into(),
                }),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(ProviderError::Decode("unreachable".into()))
                }
            }
        }
    }

    #[tokio::test]
    async fn first_success_wins() {
        let (a, a_calls) = Scripted::boxed("a", true, Behaviour::Reply("from a"));
        let (b, b_calls) = Scripted::boxed("b", true, Behaviour::Reply("from b"));
        let gateway = Gateway::new(vec![a, b], DEFAULT_TIMEOUT);

        let resp = gateway.generate_with_fallback("p", 10).await;
        assert!(resp.success);
        assert_eq!(resp.content, "from a");
        assert_eq!(resp.provider, "a");
        assert_eq!(resp.model, "scripted-1");
        assert_eq!(resp.tokens_used, 7);
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failures_and_unavailable_are_skipped() {
        let (off, off_calls) = Scripted::boxed("off", false, Behaviour::Reply("never"));
        let (bad, bad_calls) = Scripted::boxed("bad", true, Behaviour::Fail);
        let (good, _) = Scripted::boxed("good", true, Behaviour::Reply("ok"));
        let gateway = Gateway::new(vec![off, bad, good], DEFAULT_TIMEOUT);

        let resp = gateway.generate_with_fallback("p", 10).await;
        assert_eq!(resp.provider, "good");
        assert_eq!(off_calls.load(Ordering::SeqCst), 0);
        assert_eq!(bad_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn every_call_restarts_from_the_top() {
        let (bad, bad_calls) = Scripted::boxed("bad", true, Behaviour::Fail);
        let (good, _) = Scripted::boxed("good", true, Behaviour::Reply("ok"));
        let gateway = Gateway::new(vec![bad, good], DEFAULT_TIMEOUT);

        gateway.generate_with_fallback("p", 10).await;
        gateway.generate_with_fallback("p", 10).await;
        assert_eq!(bad_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn hung_provider_times_out() {
        let (slow, _) = Scripted::boxed("slow", true, Behaviour::Hang);
        let (good, _) = Scripted::boxed("good", true, Behaviour::Reply("ok"));
        let gateway = Gateway::new(vec![slow, good], Duration::from_millis(50));

        let resp = gateway.generate_with_fallback("p", 10).await;
        assert!(resp.success);
        assert_eq!(resp.provider, "good");
    }

    #[tokio::test]
    async fn exhaustion_returns_failure_envelope() {
        let (bad, _) = Scripted::boxed("bad", true, Behaviour::Fail);
        let gateway = Gateway::new(vec![bad], DEFAULT_TIMEOUT);
        let resp = gateway.generate_with_fallback("p", 10).await;
        assert!(!resp.success);
        assert!(resp.content.is_empty());
        assert_eq!(resp.error.as_deref(), Some("All providers failed"));

        let empty = Gateway::new(Vec::new(), DEFAULT_TIMEOUT);
        let resp = empty.generate_with_fallback("p", 10).await;
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("No providers available"));
    }

    #[test]
    fn health_reports_availability() {
        let (on, _) = Scripted::boxed("on", true, Behaviour::Fail);
        let (off, _) = Scripted::boxed("off", false, Behaviour::Fail);
        let report = Gateway::new(vec![on, off], DEFAULT_TIMEOUT).health();
        assert_eq!(report.available_providers, 1);
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.providers[1].name, "off");
        assert!(!report.providers[1].available);

        let (off, _) = Scripted::boxed("off", false, Behaviour::Fail);
        let report = Gateway::new(vec![off], DEFAULT_TIMEOUT).health();
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.status.as_str(), "degraded");
    }
}
