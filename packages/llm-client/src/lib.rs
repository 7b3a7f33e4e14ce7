//! Pure chat-completion REST client
//!
//! Single-turn text generation against OpenAI chat completions and the
//! Anthropic messages API, with no domain-specific logic.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_client::{AnthropicClient, CompletionRequest};
//!
//! let client = AnthropicClient::from_env()?;
//! let completion = client
//!     .complete(
//!         &CompletionRequest::new("claude-3-haiku-20240307", "Say hello")
//!             .system("You are terse.")
//!             .max_tokens(50),
//!     )
//!     .await?;
//! println!("{}", completion.content);
//! ```

pub mod anthropic;
pub mod error;
pub mod openai;
pub mod types;

pub use anthropic::AnthropicClient;
pub use error::{LlmError, Result};
pub use openai::OpenAIClient;
pub use types::{Completion, CompletionRequest, Usage};

/// Requests that take longer than this fail with [`LlmError::Network`].
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

#[cfg(test)]
pub(crate) mod testing {
    use tokio::net::TcpListener;

    /// An endpoint that accepts connections and never answers.
    pub async fn silent_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{}", addr)
    }
}
