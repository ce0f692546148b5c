//! LLM provider trait for generating answers

use async_trait::async_trait;
use crate::error::Result;

/// Output of one generation call, already converted from the provider's wire shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation {
    /// Concatenated text parts; `None` when the model returned no text
    pub text: Option<String>,
    /// Model that produced the text
    pub model: String,
    /// Provider-reported finish reason (e.g. `STOP`, `SAFETY`)
    pub finish_reason: Option<String>,
}

/// Trait for prompt-in, text-out generation
///
/// Implementations:
/// - `GeminiLlm`: Google Generative Language API (gemini-1.5-flash)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for a fully assembled prompt
    async fn generate(&self, prompt: &str) -> Result<Generation>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
