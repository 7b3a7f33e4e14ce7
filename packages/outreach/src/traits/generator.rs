//! Text generation trait.
//!
//! Implementations wrap a specific provider (Anthropic, OpenAI, ...). The
//! composer never lets an error from here reach the orchestrator.

use async_trait::async_trait;

use crate::error::GenerationResult;

/// A single-turn generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// System role instructions
    pub system: String,

    /// User prompt
    pub prompt: String,

    /// Output token budget
    pub max_tokens: u32,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult<String>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}
