//! Error types for the completion clients.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, LlmError>;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Missing API key or invalid settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failed or timed out
    #[error("Network error: {0}")]
    Network(String),

    /// Provider returned 429
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Any other non-2xx response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl LlmError {
    /// A failed send. Timeouts land here too, so callers can treat a
    /// stalled provider like an unreachable one.
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Network(format!("request timed out: {}", e))
        } else {
            Self::Network(e.to_string())
        }
    }

    /// A failed body read. Only a timeout is a network problem; anything else
    /// means the body was not what we expected.
    pub(crate) fn from_body(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Network(format!("response timed out: {}", e))
        } else {
            Self::Parse(e.to_string())
        }
    }

    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited(body)
        } else {
            Self::Api {
                status: status.as_u16(),
                message: body,
            }
        }
    }
}
