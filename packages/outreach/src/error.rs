//! Typed errors for the outreach library.
//!
//! Each error type matches one containment boundary: a driver call, a
//! text-generation call, one outreach attempt, one discovery pass, or the run.

use thiserror::Error;

use crate::types::attempt::OutreachStep;

/// Errors surfaced by a page driver.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// No element matched the selector
    #[error("element not found: {selector}")]
    NotFound { selector: String },

    /// The element was detached from the document
    #[error("stale element: {0}")]
    Stale(String),

    /// Another element received the click
    #[error("click intercepted: {0}")]
    Intercepted(String),

    /// Browser session could not be opened or was lost
    #[error("session error: {0}")]
    Session(String),

    /// Any other driver-level failure
    #[error("driver error: {0}")]
    Protocol(String),
}

impl DriverError {
    pub fn not_found(selector: impl ToString) -> Self {
        Self::NotFound {
            selector: selector.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors from the external text-generation service.
///
/// The composer treats every variant the same way (fall back to the
/// template), the variants exist for logging.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("generator not configured: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("generator returned no usable text")]
    Empty,
}

impl From<llm_client::LlmError> for GenerationError {
    fn from(err: llm_client::LlmError) -> Self {
        use llm_client::LlmError;
        match err {
            LlmError::Config(msg) => Self::Config(msg),
            LlmError::Network(msg) => Self::Network(msg),
            LlmError::RateLimited(msg) => Self::RateLimited(msg),
            api @ LlmError::Api { .. } => Self::Api(api.to_string()),
            LlmError::Parse(msg) => Self::Parse(msg),
        }
    }
}

/// Why a single outreach attempt failed.
#[derive(Debug, Error)]
pub enum OutreachError {
    /// Neither the primary nor the overflow-menu connect control exists.
    /// Covers already-connected, pending, and layout drift.
    #[error("connect control not found")]
    ConnectNotFound,

    #[error("note option not available")]
    NoteUnavailable,

    #[error("{step} failed: {source}")]
    Driver {
        step: OutreachStep,
        #[source]
        source: DriverError,
    },
}

impl OutreachError {
    pub fn driver(step: OutreachStep, source: DriverError) -> Self {
        Self::Driver { step, source }
    }
}

/// Discovery could not query the listing at all.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("invalid listing URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to open listing: {0}")]
    Navigation(#[source] DriverError),

    #[error("failed to query listing: {0}")]
    Query(#[source] DriverError),
}

/// Configuration problems detected before any browser work.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing credential: set {var}")]
    MissingCredential { var: &'static str },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Fatal run-level errors.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to start browser session: {0}")]
    Launch(#[source] DriverError),

    #[error("session not verified: {reason}")]
    SessionNotVerified { reason: String },
}

pub type DriverResult<T> = std::result::Result<T, DriverError>;

pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

pub type Result<T> = std::result::Result<T, RunError>;
