//! LLM provider trait for generating answers

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GenerationRequest, GenerationResponse};

/// Trait for text generation
///
/// Implementations:
/// - `GeminiClient`: Google Generative Language API (gemini-1.5-flash)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one request and return the response text unmodified
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;

    /// Check if the provider is usable (credential present)
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
