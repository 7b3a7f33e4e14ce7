//! Anthropic messages API.
//!
//! System instructions go in the dedicated top-level `system` field, not in
//! the message list.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{LlmError, Result};
use crate::DEFAULT_TIMEOUT;
use crate::types::{
    AnthropicRequest, AnthropicResponse, Completion, CompletionRequest, Usage, WireMessage,
};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub struct AnthropicClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.anthropic.com/v1".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create from `ANTHROPIC_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| LlmError::Config("ANTHROPIC_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upper bound on one request, connect through body.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let start = std::time::Instant::now();

        let body = AnthropicRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            system: request.system.as_deref(),
            messages: vec![WireMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .http_client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Anthropic request failed");
                LlmError::from_send(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Anthropic API error");
            return Err(LlmError::from_status(status, error_text));
        }

        let raw: AnthropicResponse = response
            .json()
            .await
            .map_err(LlmError::from_body)?;

        // Only text blocks carry the answer
        let content: String = raw
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if content.is_empty() {
            return Err(LlmError::Parse("No text content in Anthropic response".into()));
        }

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "Anthropic message"
        );

        Ok(Completion {
            content,
            usage: raw.usage.map(|u| Usage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        })
    }
}
