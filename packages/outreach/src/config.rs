//! Run configuration.
//!
//! [`RunConfig`] holds the per-run inputs (target company, affiliation,
//! quota). Provider credentials and browser settings come from the
//! environment and are kept apart so they can be validated before any
//! browser work starts.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::ai::{anthropic, openai, AnthropicGenerator, OpenAIGenerator};
use crate::error::ConfigError;
use crate::security::ApiKey;
use crate::traits::generator::TextGenerator;

pub const DEFAULT_MAX_CANDIDATES: usize = 10;
pub const MAX_CANDIDATES_LIMIT: usize = 50;
pub const DEFAULT_FAILURE_LOG: &str = "failed_requests.txt";
pub const DEFAULT_SITE_URL: &str = "https://www.linkedin.com";

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub company: String,
    pub affiliation: String,
    pub max_candidates: usize,
    /// Numeric school facet for the people listing
    pub school_facet: Option<String>,
    pub failure_log: PathBuf,
    pub site_url: String,
}

impl RunConfig {
    pub fn new(company: impl Into<String>, affiliation: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            affiliation: affiliation.into(),
            max_candidates: DEFAULT_MAX_CANDIDATES,
            school_facet: None,
            failure_log: PathBuf::from(DEFAULT_FAILURE_LOG),
            site_url: DEFAULT_SITE_URL.to_string(),
        }
    }

    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    pub fn with_school_facet(mut self, facet: Option<String>) -> Self {
        self.school_facet = facet;
        self
    }

    pub fn with_failure_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.failure_log = path.into();
        self
    }

    pub fn with_site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = url.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.company.trim().is_empty() {
            return Err(invalid("company", "must not be empty"));
        }
        if self.affiliation.trim().is_empty() {
            return Err(invalid("affiliation", "must not be empty"));
        }
        if !(1..=MAX_CANDIDATES_LIMIT).contains(&self.max_candidates) {
            return Err(invalid(
                "max_candidates",
                format!(
                    "{} is outside 1..={}",
                    self.max_candidates, MAX_CANDIDATES_LIMIT
                ),
            ));
        }
        if let Some(facet) = &self.school_facet {
            if facet.is_empty() || !facet.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid("school_facet", format!("{:?} is not numeric", facet)));
            }
        }
        url::Url::parse(&self.site_url).map_err(|e| invalid("site_url", e.to_string()))?;
        Ok(())
    }

    /// Landing page used to verify the session is logged in.
    pub fn home_url(&self) -> String {
        format!("{}/feed/", self.site_url.trim_end_matches('/'))
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

// =============================================================================
// Text generation
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Provider {
    #[default]
    Anthropic,
    OpenAI,
}

impl Provider {
    /// Environment variables holding the API key, preferred first.
    pub fn key_vars(&self) -> &'static [&'static str] {
        match self {
            Self::Anthropic => &["ANTHROPIC_API_KEY", "CLAUDE_API_KEY"],
            Self::OpenAI => &["OPENAI_API_KEY"],
        }
    }

    pub fn model_var(&self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_MODEL",
            Self::OpenAI => "OPENAI_MODEL",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => anthropic::DEFAULT_MODEL,
            Self::OpenAI => openai::DEFAULT_MODEL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Anthropic => "anthropic",
            Self::OpenAI => "openai",
        })
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAI),
            other => Err(invalid("provider", format!("unknown provider {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeneratorSettings {
    pub provider: Provider,
    pub api_key: Option<ApiKey>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// Per-request bound; `None` keeps the client default
    pub timeout: Option<Duration>,
}

impl GeneratorSettings {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    /// Key and model for `provider` from the environment.
    pub fn from_env(provider: Provider) -> Self {
        Self {
            provider,
            api_key: ApiKey::from_env(provider.key_vars()),
            model: non_empty_var(provider.model_var()),
            base_url: None,
            timeout: None,
        }
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(ApiKey::new(key));
        self
    }

    /// Overrides the environment model; `None` keeps it.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        if model.is_some() {
            self.model = model;
        }
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Fails with [`ConfigError::MissingCredential`] when no key is set.
    pub fn build(&self) -> Result<Arc<dyn TextGenerator>, ConfigError> {
        let key = self
            .api_key
            .as_ref()
            .ok_or(ConfigError::MissingCredential {
                var: self.provider.key_vars()[0],
            })?;
        debug!(provider = %self.provider, key_origin = %key.origin(), "Building text generator");

        let generator: Arc<dyn TextGenerator> = match self.provider {
            Provider::Anthropic => {
                let mut generator = AnthropicGenerator::new(key).with_model(self.model());
                if let Some(url) = &self.base_url {
                    generator = generator.with_base_url(url);
                }
                if let Some(timeout) = self.timeout {
                    generator = generator.with_timeout(timeout);
                }
                Arc::new(generator)
            }
            Provider::OpenAI => {
                let mut generator = OpenAIGenerator::new(key).with_model(self.model());
                if let Some(url) = &self.base_url {
                    generator = generator.with_base_url(url);
                }
                if let Some(timeout) = self.timeout {
                    generator = generator.with_timeout(timeout);
                }
                Arc::new(generator)
            }
        };
        Ok(generator)
    }
}

// =============================================================================
// Browser
// =============================================================================

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub binary: Option<String>,
    /// Persistent profile directory holding the logged-in session
    pub profile_dir: Option<PathBuf>,
    pub headless: bool,
    /// Bound on each WebDriver command
    pub command_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: webdriver_client::DEFAULT_URL.to_string(),
            binary: None,
            profile_dir: None,
            headless: false,
            command_timeout: webdriver_client::DEFAULT_TIMEOUT,
        }
    }
}

impl BrowserSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            webdriver_url: non_empty_var("WEBDRIVER_URL").unwrap_or(defaults.webdriver_url),
            binary: non_empty_var("BROWSER_BINARY"),
            profile_dir: non_empty_var("BROWSER_PROFILE_DIR").map(PathBuf::from),
            headless: non_empty_var("BROWSER_HEADLESS")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.headless),
            command_timeout: non_empty_var("WEBDRIVER_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.command_timeout),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = RunConfig::new("Google", "Vanderbilt University");
        assert!(config.validate().is_ok());
        assert_eq!(config.max_candidates, DEFAULT_MAX_CANDIDATES);
        assert_eq!(config.failure_log, PathBuf::from("failed_requests.txt"));
        assert_eq!(config.home_url(), "https://www.linkedin.com/feed/");
    }

    #[test]
    fn test_cap_outside_range_is_rejected() {
        for cap in [0, 51] {
            let err = RunConfig::new("Google", "Vanderbilt University")
                .with_max_candidates(cap)
                .validate()
                .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { field: "max_candidates", .. }));
        }
        assert!(RunConfig::new("Google", "Vanderbilt University")
            .with_max_candidates(50)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_blank_target_is_rejected() {
        let err = RunConfig::new("  ", "Vanderbilt University")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "company", .. }));

        let err = RunConfig::new("Google", "").validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "affiliation", .. }));
    }

    #[test]
    fn test_school_facet_must_be_numeric() {
        let base = RunConfig::new("Google", "Vanderbilt University");
        assert!(base
            .clone()
            .with_school_facet(Some("4565".into()))
            .validate()
            .is_ok());
        assert!(base
            .with_school_facet(Some("vandy".into()))
            .validate()
            .is_err());
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("anthropic".parse::<Provider>().unwrap(), Provider::Anthropic);
        assert_eq!("Claude".parse::<Provider>().unwrap(), Provider::Anthropic);
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert!("gemini".parse::<Provider>().is_err());
        assert_eq!(Provider::OpenAI.to_string(), "openai");
    }

    #[test]
    fn test_missing_key_names_the_variable() {
        let err = GeneratorSettings::new(Provider::Anthropic)
            .build()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ConfigError::MissingCredential { var: "ANTHROPIC_API_KEY" }
        ));
    }

    #[test]
    fn test_build_uses_configured_model() {
        let settings = GeneratorSettings::new(Provider::OpenAI)
            .with_api_key("sk-test")
            .with_model(Some("gpt-4o".into()));
        assert_eq!(settings.model(), "gpt-4o");

        let generator = settings.build().unwrap();
        assert_eq!(generator.name(), "openai");

        let defaulted = GeneratorSettings::new(Provider::Anthropic).with_model(None);
        assert_eq!(defaulted.model(), "claude-3-haiku-20240307");
    }

    #[test]
    fn test_api_key_is_redacted_in_debug() {
        let settings = GeneratorSettings::new(Provider::Anthropic).with_api_key("sk-ant-secret");
        assert!(!format!("{:?}", settings).contains("sk-ant-secret"));
    }

    #[test]
    fn test_flag_parsing() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("nope"));
    }
}
