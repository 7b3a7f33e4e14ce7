//! Claude via the Anthropic messages API.

use std::time::Duration;

use async_trait::async_trait;
use llm_client::{AnthropicClient, CompletionRequest};
use tracing::debug;

use crate::error::{GenerationError, GenerationResult};
use crate::security::ApiKey;
use crate::traits::generator::{GenerationRequest, TextGenerator};

pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

#[derive(Clone)]
pub struct AnthropicGenerator {
    client: AnthropicClient,
    model: String,
}

impl AnthropicGenerator {
    pub fn new(api_key: &ApiKey) -> Self {
        Self {
            client: AnthropicClient::new(api_key.expose()),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at a proxy or a local test server.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult<String> {
        let completion = self
            .client
            .complete(
                &CompletionRequest::new(&self.model, &request.prompt)
                    .system(&request.system)
                    .max_tokens(request.max_tokens),
            )
            .await
            .map_err(GenerationError::from)?;

        if let Some(usage) = &completion.usage {
            debug!(
                model = %self.model,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Note generated"
            );
        }
        Ok(completion.content)
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            system: "You are a professional networking assistant.".into(),
            prompt: "Write a note to Ada".into(),
            max_tokens: 150,
        }
    }

    #[tokio::test]
    async fn test_generate_returns_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/messages")
            .match_header("x-api-key", "sk-ant-test")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"model": "claude-3-haiku-20240307", "system": "You are a professional networking assistant."}"#.to_string(),
            ))
            .with_status(200)
            .with_body(
                r#"{"content": [{"type": "text", "text": "Hi Ada, let's chat."}],
                    "usage": {"input_tokens": 40, "output_tokens": 9}}"#,
            )
            .create_async()
            .await;

        let generator =
            AnthropicGenerator::new(&ApiKey::new("sk-ant-test")).with_base_url(server.url());

        assert_eq!(generator.generate(&request()).await.unwrap(), "Hi Ada, let's chat.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_generation_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/messages")
            .with_status(429)
            .with_body(r#"{"type": "error", "error": {"type": "rate_limit_error"}}"#)
            .create_async()
            .await;

        let generator =
            AnthropicGenerator::new(&ApiKey::new("sk-ant-test")).with_base_url(server.url());

        let err = generator.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::RateLimited(_)));
    }
}
