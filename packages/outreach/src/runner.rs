//! Run controller.
//!
//! Sequences one run: validate, launch, verify the session, discover,
//! orchestrate, tear down. The browser session is quit on every path that
//! opened it.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::{GeneratorSettings, RunConfig};
use crate::error::{RunError, Result};
use crate::locator::Locators;
use crate::pacing::{HumanPacer, Pause};
use crate::pipeline::{Discoverer, MessageComposer, Orchestrator};
use crate::traits::{
    driver::{PageDriver, SessionLauncher},
    generator::TextGenerator,
    pacer::Pacer,
};
use crate::types::report::RunReport;

/// URL fragments that mean the browser was bounced to a sign-in page.
const LOGGED_OUT_MARKERS: [&str; 2] = ["login", "authwall"];

pub struct RunController<L: SessionLauncher> {
    config: RunConfig,
    generator: Arc<dyn TextGenerator>,
    launcher: L,
    pacer: Arc<dyn Pacer>,
    locators: Locators,
    discover_only: bool,
}

impl<L: SessionLauncher> RunController<L> {
    pub fn new(config: RunConfig, generator: Arc<dyn TextGenerator>, launcher: L) -> Self {
        Self {
            config,
            generator,
            launcher,
            pacer: Arc::new(HumanPacer::default()),
            locators: Locators::default(),
            discover_only: false,
        }
    }

    /// Builds the generator first, so a missing credential fails before any
    /// browser is started.
    pub fn from_settings(
        config: RunConfig,
        settings: &GeneratorSettings,
        launcher: L,
    ) -> Result<Self> {
        let generator = settings.build()?;
        Ok(Self::new(config, generator, launcher))
    }

    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_locators(mut self, locators: Locators) -> Self {
        self.locators = locators;
        self
    }

    /// List candidates without contacting anyone.
    pub fn discover_only(mut self, enabled: bool) -> Self {
        self.discover_only = enabled;
        self
    }

    pub async fn run(&self) -> Result<RunReport> {
        self.config.validate()?;

        self.execute(Uuid::now_v7()).await
    }

    #[instrument(
        name = "run",
        skip(self),
        fields(company = %self.config.company, affiliation = %self.config.affiliation)
    )]
    async fn execute(&self, run_id: Uuid) -> Result<RunReport> {
        let started_at = Utc::now();
        info!(
            max_candidates = self.config.max_candidates,
            generator = self.generator.name(),
            discover_only = self.discover_only,
            "Starting run"
        );

        let driver = self.launcher.launch().await.map_err(RunError::Launch)?;

        if let Err(e) = self.verify_session(&driver).await {
            shutdown(&driver).await;
            return Err(e);
        }
        info!("Session verified");

        let discovery = self
            .discoverer()
            .discover(
                &driver,
                &self.config.company,
                &self.config.affiliation,
                self.config.max_candidates,
            )
            .await;
        let discovered = match discovery {
            Ok(candidates) => candidates,
            Err(e) => {
                error!(error = %e, "Discovery failed, continuing with no candidates");
                Vec::new()
            }
        };

        let attempts = if self.discover_only {
            info!(count = discovered.len(), "Discover-only run, skipping outreach");
            Vec::new()
        } else {
            self.orchestrator().run(&driver, &discovered).await
        };

        shutdown(&driver).await;

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            discovered,
            attempts,
        };
        info!(
            discovered = report.discovered.len(),
            sent = report.sent(),
            failed = report.failed(),
            "Run complete"
        );
        Ok(report)
    }

    /// Home page must load without a sign-in redirect and show the nav bar.
    async fn verify_session<D: PageDriver + ?Sized>(&self, driver: &D) -> Result<()> {
        let home = self.config.home_url();
        driver
            .navigate(&home)
            .await
            .map_err(|e| not_verified(format!("could not open {}: {}", home, e)))?;
        self.pacer.pause(Pause::SessionSettle).await;

        let current = driver
            .current_url()
            .await
            .map_err(|e| not_verified(format!("could not read current URL: {}", e)))?;
        let lowered = current.to_ascii_lowercase();
        if LOGGED_OUT_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Err(not_verified(format!("redirected to sign-in page {}", current)));
        }

        match self.locators.nav_landmark.locate(driver).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(not_verified("navigation bar not found")),
            Err(e) => Err(not_verified(format!("navigation bar check failed: {}", e))),
        }
    }

    fn discoverer(&self) -> Discoverer {
        Discoverer::new(
            self.config.site_url.clone(),
            self.locators.clone(),
            self.pacer.clone(),
        )
        .with_school_facet(self.config.school_facet.clone())
    }

    fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(
            &self.config,
            MessageComposer::new(self.generator.clone()),
            self.locators.clone(),
            self.pacer.clone(),
        )
    }
}

fn not_verified(reason: impl Into<String>) -> RunError {
    RunError::SessionNotVerified {
        reason: reason.into(),
    }
}

async fn shutdown<D: PageDriver + ?Sized>(driver: &D) {
    match driver.quit().await {
        Ok(()) => info!("Browser session closed"),
        Err(e) => warn!(error = %e, "Failed to close browser session"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Provider;
    use crate::error::{ConfigError, DriverError};
    use crate::pipeline::discover::listing_url;
    use crate::locator::{Locator, Selector};
    use crate::testing::{
        MockElement, MockLauncher, MockPage, MockPageDriver, MockTextGenerator, RecordingPacer,
    };
    use tempfile::TempDir;

    const HOME: &str = "https://www.linkedin.com/feed/";

    fn config(dir: &TempDir) -> RunConfig {
        RunConfig::new("Google", "Vanderbilt University")
            .with_failure_log(dir.path().join("failed_requests.txt"))
    }

    fn controller(
        config: RunConfig,
        launcher: MockLauncher,
        pacer: &RecordingPacer,
    ) -> RunController<MockLauncher> {
        RunController::new(config, Arc::new(MockTextGenerator::new()), launcher)
            .with_pacer(Arc::new(pacer.clone()))
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_launch() {
        let dir = TempDir::new().unwrap();
        let launcher = MockLauncher::new(MockPageDriver::new());

        let result = RunController::from_settings(
            config(&dir),
            &GeneratorSettings::new(Provider::Anthropic),
            launcher.clone(),
        );

        assert!(matches!(
            result.err(),
            Some(RunError::Config(ConfigError::MissingCredential { .. }))
        ));
        assert_eq!(launcher.launches(), 0);
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_launch() {
        let dir = TempDir::new().unwrap();
        let launcher = MockLauncher::new(MockPageDriver::new());
        let pacer = RecordingPacer::new();

        let err = controller(config(&dir).with_max_candidates(0), launcher.clone(), &pacer)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Config(_)));
        assert_eq!(launcher.launches(), 0);
    }

    #[tokio::test]
    async fn test_launch_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let launcher = MockLauncher::failing(DriverError::Session("chromedriver not running".into()));

        let err = controller(config(&dir), launcher, &RecordingPacer::new())
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Launch(_)));
    }

    #[tokio::test]
    async fn test_login_redirect_aborts_and_quits() {
        let dir = TempDir::new().unwrap();
        let driver = MockPageDriver::new().with_page(
            HOME,
            MockPage::new().redirecting_to("https://www.linkedin.com/login?session_redirect=feed"),
        );
        let launcher = MockLauncher::new(driver.clone());

        let err = controller(config(&dir), launcher, &RecordingPacer::new())
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::SessionNotVerified { .. }));
        assert_eq!(driver.navigations(), vec![HOME]);
        assert_eq!(driver.quit_count(), 1);
    }

    #[tokio::test]
    async fn test_login_redirect_is_matched_case_insensitively() {
        let dir = TempDir::new().unwrap();
        let locators = Locators::default();
        // Nav landmark present, so only the URL check can reject this
        let driver = MockPageDriver::new().with_page(
            HOME,
            MockPage::home(&locators).redirecting_to("https://www.linkedin.com/AuthWall?trk=feed"),
        );
        let launcher = MockLauncher::new(driver.clone());

        let err = controller(config(&dir), launcher, &RecordingPacer::new())
            .run()
            .await
            .unwrap_err();

        assert!(err.to_string().contains("AuthWall"), "{}", err);
        assert_eq!(driver.quit_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_nav_landmark_aborts_and_quits() {
        let dir = TempDir::new().unwrap();
        let driver = MockPageDriver::new().with_page(HOME, MockPage::new());
        let launcher = MockLauncher::new(driver.clone());

        let err = controller(config(&dir), launcher, &RecordingPacer::new())
            .run()
            .await
            .unwrap_err();

        assert!(err.to_string().contains("navigation bar not found"));
        assert_eq!(driver.quit_count(), 1);
    }

    #[tokio::test]
    async fn test_custom_locators_drive_session_check() {
        let dir = TempDir::new().unwrap();
        let mut locators = Locators::default();
        locators.nav_landmark = Locator::new("nav landmark").or(Selector::id("app-shell-nav"));
        let driver = MockPageDriver::new().with_page(
            HOME,
            MockPage::new().with_element(&Selector::id("app-shell-nav"), MockElement::new("")),
        );
        let launcher = MockLauncher::new(driver.clone());

        let report = controller(config(&dir), launcher, &RecordingPacer::new())
            .with_locators(locators)
            .run()
            .await
            .unwrap();

        assert!(report.discovered.is_empty());
        assert_eq!(driver.quit_count(), 1);
    }

    #[tokio::test]
    async fn test_discover_only_sends_nothing() {
        let dir = TempDir::new().unwrap();
        let locators = Locators::default();
        let listing = listing_url(
            "https://www.linkedin.com",
            "Google",
            "Vanderbilt University",
            None,
        )
        .unwrap();
        let driver = MockPageDriver::new()
            .with_page(HOME, MockPage::home(&locators))
            .with_page(
                listing,
                MockPage::listing(
                    &locators,
                    &[
                        ("https://www.linkedin.com/in/ada", Some("Ada Lovelace")),
                        ("https://www.linkedin.com/in/grace", Some("Grace Hopper")),
                    ],
                ),
            );
        let launcher = MockLauncher::new(driver.clone());
        let generator = Arc::new(MockTextGenerator::new());
        let pacer = RecordingPacer::new();

        let report = RunController::new(config(&dir), generator.clone(), launcher)
            .with_pacer(Arc::new(pacer.clone()))
            .discover_only(true)
            .run()
            .await
            .unwrap();

        assert_eq!(report.discovered.len(), 2);
        assert!(report.attempts.is_empty());
        assert!(generator.requests().is_empty());
        assert!(driver.clicked().is_empty());
        assert_eq!(pacer.count(Pause::BetweenCandidates), 0);
        assert_eq!(driver.quit_count(), 1);
    }

    #[tokio::test]
    async fn test_discovery_error_yields_empty_run() {
        let dir = TempDir::new().unwrap();
        let locators = Locators::default();
        let listing = listing_url(
            "https://www.linkedin.com",
            "Google",
            "Vanderbilt University",
            None,
        )
        .unwrap();
        let driver = MockPageDriver::new()
            .with_page(HOME, MockPage::home(&locators))
            .with_navigate_error(listing, DriverError::Protocol("timeout".into()));
        let launcher = MockLauncher::new(driver.clone());

        let report = controller(config(&dir), launcher, &RecordingPacer::new())
            .run()
            .await
            .unwrap();

        assert!(report.discovered.is_empty());
        assert!(report.attempts.is_empty());
        assert_eq!(driver.quit_count(), 1);
    }
}
