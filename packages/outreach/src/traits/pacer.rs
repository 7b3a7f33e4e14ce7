use async_trait::async_trait;

use crate::pacing::Pause;

/// Decides how long each deliberate pause lasts, and waits it out.
///
/// Every pause is unconditional: callers never skip one based on page state.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, pause: Pause);
}
