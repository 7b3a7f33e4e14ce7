//! Paced, personalized connection-request outreach.
//!
//! Drives an already logged-in browser session through a professional
//! network: finds people at a target company who share an affiliation with
//! the operator, writes each a short note with a language model, and sends
//! connection requests one at a time with humanlike pauses in between.
//!
//! # Usage
//!
//! ```rust,ignore
//! use outreach::{GeneratorSettings, Provider, RunConfig, RunController};
//! use outreach::{BrowserSettings, WebDriverLauncher};
//!
//! let config = RunConfig::new("Google", "Vanderbilt University").with_max_candidates(5);
//! let launcher = WebDriverLauncher::new(&BrowserSettings::from_env());
//! let controller = RunController::from_settings(
//!     config,
//!     &GeneratorSettings::from_env(Provider::Anthropic),
//!     launcher,
//! )?;
//!
//! let report = controller.run().await?;
//! println!("sent {} of {}", report.sent(), report.discovered.len());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams for the browser, the text generator and pacing
//! - [`pipeline`] - Discovery, note composition and the connect-and-send protocol
//! - [`runner`] - Run sequencing and session verification
//! - [`locator`] - Named controls with fallback selectors
//! - [`drivers`] - WebDriver-backed page driver
//! - [`ai`] - Anthropic and OpenAI text generators
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod config;
pub mod drivers;
pub mod error;
pub mod failure_log;
pub mod locator;
pub mod pacing;
pub mod pipeline;
pub mod runner;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

pub use config::{BrowserSettings, GeneratorSettings, Provider, RunConfig};
pub use drivers::{WebDriverLauncher, WebDriverPageDriver};
pub use error::{
    ConfigError, DiscoveryError, DriverError, GenerationError, OutreachError, RunError,
};
pub use failure_log::{FailureEntry, FailureLog};
pub use locator::{Locator, Locators, Selector};
pub use pacing::{DelayRange, HumanPacer, PacingConfig, Pause};
pub use runner::RunController;
pub use traits::{
    driver::{ElementHandle, PageDriver, SessionLauncher},
    generator::{GenerationRequest, TextGenerator},
    pacer::Pacer,
};
pub use types::{
    attempt::{Outcome, OutreachAttempt, OutreachStep},
    candidate::Candidate,
    report::RunReport,
};
