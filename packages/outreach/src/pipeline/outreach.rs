//! The connect-and-send protocol.
//!
//! For each candidate, in discovery order:
//!
//! ```text
//! NavigatingProfile -> LocatingConnect -> (OverflowMenu) -> ConnectClicked
//!   -> NoteSurfaceOpened -> MessageEntered -> Submitted -> Sent | Failed
//! ```
//!
//! The whole sequence for one candidate sits inside a single failure
//! boundary. A failure at any step marks the attempt `Failed`, appends it to
//! the failure log, and processing moves on. Attempts are never retried
//! within a run.
//!
//! After every candidate, sent or failed, the orchestrator waits out
//! [`Pause::BetweenCandidates`].

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::config::RunConfig;
use crate::error::{DriverError, OutreachError};
use crate::failure_log::{FailureEntry, FailureLog};
use crate::locator::{Locator, Locators};
use crate::pacing::Pause;
use crate::pipeline::compose::MessageComposer;
use crate::traits::{
    driver::{ElementHandle, PageDriver},
    pacer::Pacer,
};
use crate::types::{
    attempt::{OutreachAttempt, OutreachStep},
    candidate::Candidate,
};

pub struct Orchestrator {
    company: String,
    affiliation: String,
    composer: MessageComposer,
    locators: Locators,
    pacer: Arc<dyn Pacer>,
    failure_log: FailureLog,
}

impl Orchestrator {
    pub fn new(
        config: &RunConfig,
        composer: MessageComposer,
        locators: Locators,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            company: config.company.clone(),
            affiliation: config.affiliation.clone(),
            composer,
            locators,
            pacer,
            failure_log: FailureLog::new(config.failure_log.clone()),
        }
    }

    /// Process every candidate. Returns one attempt per candidate, in order.
    pub async fn run<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        candidates: &[Candidate],
    ) -> Vec<OutreachAttempt> {
        let mut attempts = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            attempts.push(self.process(driver, candidate).await);
            self.pacer.pause(Pause::BetweenCandidates).await;
        }

        attempts
    }

    /// Compose a note and run the protocol for one candidate.
    #[instrument(skip(self, driver, candidate), fields(person = %candidate.display_name))]
    pub async fn process<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        candidate: &Candidate,
    ) -> OutreachAttempt {
        let message = self
            .composer
            .compose(&candidate.display_name, &self.company, &self.affiliation)
            .await;

        match self.connect_and_send(driver, candidate, &message).await {
            Ok(()) => {
                info!(url = %candidate.profile_url, "Connection request sent");
                OutreachAttempt::sent(candidate.clone(), message)
            }
            Err(e) => {
                warn!(
                    url = %candidate.profile_url,
                    reason = %e,
                    "Could not send connection request"
                );
                self.failure_log
                    .record(&FailureEntry::new(candidate, &self.company, &self.affiliation))
                    .await;
                OutreachAttempt::failed(candidate.clone(), message, e.to_string())
            }
        }
    }

    async fn connect_and_send<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        candidate: &Candidate,
        message: &str,
    ) -> Result<(), OutreachError> {
        use OutreachStep::*;

        driver
            .navigate(&candidate.profile_url)
            .await
            .map_err(|e| OutreachError::driver(NavigatingProfile, e))?;
        self.pacer.pause(Pause::ProfileSettle).await;

        let connect = self.locate_connect(driver).await?;
        self.click(driver, &connect, ConnectClicked).await?;
        self.pacer.pause(Pause::ClickSettle).await;

        let add_note = self
            .locators
            .add_note
            .locate(driver)
            .await
            .map_err(|e| OutreachError::driver(NoteSurfaceOpened, e))?
            .ok_or(OutreachError::NoteUnavailable)?;
        self.click(driver, &add_note, NoteSurfaceOpened).await?;
        self.pacer.pause(Pause::ClickSettle).await;

        let input = self.require(driver, &self.locators.note_input, MessageEntered).await?;
        driver
            .send_text(&input, message)
            .await
            .map_err(|e| OutreachError::driver(MessageEntered, e))?;
        debug!(chars = message.chars().count(), "Note entered");
        self.pacer.pause(Pause::NoteEntered).await;

        let send = self.require(driver, &self.locators.send, Submitted).await?;
        self.click(driver, &send, Submitted).await?;
        self.pacer.pause(Pause::AfterSend).await;

        Ok(())
    }

    /// Primary connect control, else the one nested under the overflow menu.
    async fn locate_connect<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
    ) -> Result<ElementHandle, OutreachError> {
        let found = self
            .locators
            .connect
            .locate(driver)
            .await
            .map_err(|e| OutreachError::driver(OutreachStep::LocatingConnect, e))?;
        if let Some(connect) = found {
            return Ok(connect);
        }

        debug!("Connect not visible, trying the overflow menu");
        let more = self
            .locators
            .more_actions
            .locate(driver)
            .await
            .map_err(|e| OutreachError::driver(OutreachStep::OverflowMenu, e))?
            .ok_or(OutreachError::ConnectNotFound)?;
        self.click(driver, &more, OutreachStep::OverflowMenu).await?;
        self.pacer.pause(Pause::MenuSettle).await;

        self.locators
            .connect_in_menu
            .locate(driver)
            .await
            .map_err(|e| OutreachError::driver(OutreachStep::OverflowMenu, e))?
            .ok_or(OutreachError::ConnectNotFound)
    }

    async fn require<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        locator: &Locator,
        step: OutreachStep,
    ) -> Result<ElementHandle, OutreachError> {
        locator
            .locate(driver)
            .await
            .map_err(|e| OutreachError::driver(step, e))?
            .ok_or_else(|| OutreachError::driver(step, DriverError::not_found(&locator.name)))
    }

    async fn click<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        element: &ElementHandle,
        step: OutreachStep,
    ) -> Result<(), OutreachError> {
        // Best effort; a click on an off-screen element may still land.
        if let Err(e) = driver.scroll_into_view(element).await {
            debug!(%step, error = %e, "Scroll into view failed");
        }
        driver
            .click(element)
            .await
            .map_err(|e| OutreachError::driver(step, e))
    }
}
