// src/llm/provider/mod.rs
// Remote model interface used by the classifier

use async_trait::async_trait;

use crate::error::ProviderError;

pub mod gemini;

/// A remote text model: one prompt in, free text out.
///
/// Implementations perform exactly one remote request per call and never
/// retry internally; retry policy belongs to the caller.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging/debugging
    fn name(&self) -> &'static str;

    /// Send a single-turn prompt and return the raw response text
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}
