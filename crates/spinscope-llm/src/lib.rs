//! External analysis: ranked text-generation providers behind one gateway,
//! the analysis prompt, and interpretation of what comes back.

pub mod chat;
pub mod gateway;
pub mod interpreter;
pub mod local;
pub mod prompt;
pub mod provider;

pub use chat::ChatCompletionsProvider;
pub use gateway::{Gateway, HealthReport, HealthStatus, ProviderStatus};
pub use interpreter::{ExternalEntity, ExternalRecord, ExternalTechnique, parse};
pub use local::LocalProvider;
pub use provider::{Generation, Provider, ProviderError, ProviderResponse};
