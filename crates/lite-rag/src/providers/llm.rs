//! LLM provider trait for generating answers

use async_trait::async_trait;
use crate::error::Result;

/// Trait for text generation backends
///
/// Implementations:
/// - `OllamaLlm`: Local Ollama server (tinyllama, phi3, llama3, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for `prompt` using `model`; the returned text is the
    /// backend's output verbatim.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
