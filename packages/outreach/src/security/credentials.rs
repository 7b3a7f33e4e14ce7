//! Provider API keys.
//!
//! A key remembers where it was found so startup logs can say which variable
//! supplied it. The value itself lives in a [`SecretBox`] and only leaves it
//! when a request header is built.

use std::fmt;

use secrecy::{ExposeSecret, SecretBox};

/// Where an [`ApiKey`] was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Environment variable, possibly an alias of the primary one
    Env(&'static str),
    /// Passed in directly
    Explicit,
}

impl fmt::Display for KeyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env(var) => f.write_str(var),
            Self::Explicit => f.write_str("explicit value"),
        }
    }
}

pub struct ApiKey {
    value: SecretBox<str>,
    origin: KeyOrigin,
}

impl ApiKey {
    pub fn new(value: &str) -> Self {
        Self::with_origin(value, KeyOrigin::Explicit)
    }

    /// First of `vars` set to a non-blank value, trimmed.
    ///
    /// Earlier names win, so an alias (`CLAUDE_API_KEY`) is only read when
    /// the primary variable is unset or blank.
    pub fn from_env(vars: &[&'static str]) -> Option<Self> {
        vars.iter().find_map(|&var| {
            let value = std::env::var(var).ok()?;
            let value = value.trim();
            (!value.is_empty()).then(|| Self::with_origin(value, KeyOrigin::Env(var)))
        })
    }

    fn with_origin(value: &str, origin: KeyOrigin) -> Self {
        Self {
            value: SecretBox::new(Box::from(value)),
            origin,
        }
    }

    pub fn origin(&self) -> KeyOrigin {
        self.origin
    }

    /// Only call this when building the outbound request.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }
}

impl Clone for ApiKey {
    fn clone(&self) -> Self {
        Self::with_origin(self.expose(), self.origin)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("origin", &self.origin)
            .field("value", &format_args!("[REDACTED]"))
            .finish()
    }
}
