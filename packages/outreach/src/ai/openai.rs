//! OpenAI chat completions.

use std::time::Duration;

use async_trait::async_trait;
use llm_client::{CompletionRequest, OpenAIClient};

use crate::error::GenerationResult;
use crate::security::ApiKey;
use crate::traits::generator::{GenerationRequest, TextGenerator};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Clone)]
pub struct OpenAIGenerator {
    client: OpenAIClient,
    model: String,
}

impl OpenAIGenerator {
    pub fn new(api_key: &ApiKey) -> Self {
        Self {
            client: OpenAIClient::new(api_key.expose()),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

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
impl TextGenerator for OpenAIGenerator {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult<String> {
        let completion = self
            .client
            .complete(
                &CompletionRequest::new(&self.model, &request.prompt)
                    .system(&request.system)
                    .max_tokens(request.max_tokens),
            )
            .await?;
        Ok(completion.content)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
