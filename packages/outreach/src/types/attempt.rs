//! Outcome of processing one candidate.

use std::fmt;

use crate::types::candidate::Candidate;

/// States of the connect-and-send protocol, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutreachStep {
    NavigatingProfile,
    LocatingConnect,
    OverflowMenu,
    ConnectClicked,
    NoteSurfaceOpened,
    MessageEntered,
    Submitted,
}

impl fmt::Display for OutreachStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NavigatingProfile => "navigating to profile",
            Self::LocatingConnect => "locating connect control",
            Self::OverflowMenu => "opening overflow menu",
            Self::ConnectClicked => "clicking connect",
            Self::NoteSurfaceOpened => "opening note surface",
            Self::MessageEntered => "entering message",
            Self::Submitted => "submitting request",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    Failed,
}

/// Result of one pass through the connect-and-send protocol.
#[derive(Debug, Clone)]
pub struct OutreachAttempt {
    pub candidate: Candidate,
    /// At most 300 characters.
    pub message_text: String,
    pub outcome: Outcome,
    pub failure_reason: Option<String>,
}

impl OutreachAttempt {
    pub fn sent(candidate: Candidate, message_text: String) -> Self {
        Self {
            candidate,
            message_text,
            outcome: Outcome::Sent,
            failure_reason: None,
        }
    }

    pub fn failed(candidate: Candidate, message_text: String, reason: impl Into<String>) -> Self {
        Self {
            candidate,
            message_text,
            outcome: Outcome::Failed,
            failure_reason: Some(reason.into()),
        }
    }

    pub fn is_sent(&self) -> bool {
        self.outcome == Outcome::Sent
    }
}
