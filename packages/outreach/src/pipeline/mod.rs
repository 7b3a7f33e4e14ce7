//! The three phases of a run after the session is verified.

pub mod compose;
pub mod discover;
pub mod outreach;

pub use compose::MessageComposer;
pub use discover::Discoverer;
pub use outreach::Orchestrator;
