//! Human-scale pauses between browser actions.
//!
//! Pauses are drawn uniformly from a range per [`Pause`] kind. The gap between
//! candidates has a hard floor; configuration cannot shorten it below
//! [`MIN_CANDIDATE_GAP`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::traits::pacer::Pacer;

pub const MIN_CANDIDATE_GAP: Duration = Duration::from_secs(45);

/// Every deliberate wait in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pause {
    /// After opening the home page during session verification
    SessionSettle,
    /// After opening the listing page
    ListingSettle,
    /// After scrolling the listing to load more entries
    ListingScroll,
    /// After navigating to a profile
    ProfileSettle,
    /// After expanding the overflow menu
    MenuSettle,
    /// After clicking connect or add-a-note
    ClickSettle,
    /// After typing the note
    NoteEntered,
    /// After clicking send
    AfterSend,
    /// After every candidate, whatever the outcome
    BetweenCandidates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        if max < min {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    pub fn secs(min: u64, max: u64) -> Self {
        Self::new(Duration::from_secs(min), Duration::from_secs(max))
    }

    pub fn fixed(duration: Duration) -> Self {
        Self::new(duration, duration)
    }

    /// Uniform sample with millisecond resolution.
    pub fn sample(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(fastrand::u64(min..=max))
    }
}

#[derive(Debug, Clone)]
pub struct PacingConfig {
    pub session_settle: DelayRange,
    pub listing_settle: DelayRange,
    pub listing_scroll: DelayRange,
    pub profile_settle: DelayRange,
    pub menu_settle: DelayRange,
    pub click_settle: DelayRange,
    pub note_entered: DelayRange,
    pub after_send: DelayRange,
    pub between_candidates: DelayRange,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            session_settle: DelayRange::fixed(Duration::from_secs(20)),
            listing_settle: DelayRange::fixed(Duration::from_secs(5)),
            listing_scroll: DelayRange::fixed(Duration::from_secs(2)),
            profile_settle: DelayRange::secs(4, 6),
            menu_settle: DelayRange::secs(1, 2),
            click_settle: DelayRange::secs(1, 2),
            note_entered: DelayRange::secs(2, 3),
            after_send: DelayRange::secs(3, 5),
            between_candidates: DelayRange::secs(45, 120),
        }
    }
}

impl PacingConfig {
    /// Set the inter-candidate gap, clamped so neither bound drops below
    /// [`MIN_CANDIDATE_GAP`].
    pub fn with_candidate_gap(mut self, range: DelayRange) -> Self {
        self.between_candidates = DelayRange::new(
            range.min.max(MIN_CANDIDATE_GAP),
            range.max.max(MIN_CANDIDATE_GAP),
        );
        self
    }

    pub fn range(&self, pause: Pause) -> DelayRange {
        match pause {
            Pause::SessionSettle => self.session_settle,
            Pause::ListingSettle => self.listing_settle,
            Pause::ListingScroll => self.listing_scroll,
            Pause::ProfileSettle => self.profile_settle,
            Pause::MenuSettle => self.menu_settle,
            Pause::ClickSettle => self.click_settle,
            Pause::NoteEntered => self.note_entered,
            Pause::AfterSend => self.after_send,
            Pause::BetweenCandidates => self.between_candidates,
        }
    }
}

/// Sleeps for a random duration drawn from the configured range.
#[derive(Debug, Clone, Default)]
pub struct HumanPacer {
    config: PacingConfig,
}

impl HumanPacer {
    pub fn new(config: PacingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PacingConfig {
        &self.config
    }
}

#[async_trait]
impl Pacer for HumanPacer {
    async fn pause(&self, pause: Pause) {
        let delay = self.config.range(pause).sample();
        if pause == Pause::BetweenCandidates {
            info!(
                seconds = delay.as_secs_f64(),
                "Pausing before the next profile"
            );
        } else {
            debug!(?pause, delay_ms = delay.as_millis() as u64, "Pausing");
        }
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_stays_in_range() {
        let range = DelayRange::secs(1, 2);
        for _ in 0..200 {
            let d = range.sample();
            assert!(d >= Duration::from_secs(1) && d <= Duration::from_secs(2));
        }
    }

    #[test]
    fn test_fixed_range_is_exact() {
        let range = DelayRange::fixed(Duration::from_millis(750));
        assert_eq!(range.sample(), Duration::from_millis(750));
    }

    #[test]
    fn test_inverted_bounds_are_swapped() {
        let range = DelayRange::secs(5, 3);
        assert_eq!(range.min, Duration::from_secs(3));
        assert_eq!(range.max, Duration::from_secs(5));
    }

    #[test]
    fn test_candidate_gap_cannot_go_below_floor() {
        let config = PacingConfig::default().with_candidate_gap(DelayRange::secs(1, 10));
        assert_eq!(config.between_candidates.min, MIN_CANDIDATE_GAP);
        assert_eq!(config.between_candidates.max, MIN_CANDIDATE_GAP);

        let config = PacingConfig::default().with_candidate_gap(DelayRange::secs(60, 180));
        assert_eq!(config.between_candidates, DelayRange::secs(60, 180));
    }

    #[test]
    fn test_listing_waits_match_page_behaviour() {
        let config = PacingConfig::default();
        assert_eq!(config.range(Pause::ListingSettle), DelayRange::fixed(Duration::from_secs(5)));
        assert_eq!(config.range(Pause::ListingScroll), DelayRange::fixed(Duration::from_secs(2)));
    }

    #[test]
    fn test_default_gap_respects_floor() {
        let config = PacingConfig::default();
        assert!(config.range(Pause::BetweenCandidates).min >= MIN_CANDIDATE_GAP);
    }
}
