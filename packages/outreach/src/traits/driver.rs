//! Page driver trait for browser automation.
//!
//! The page driver is the only thing in the crate that touches the browser.
//! Every operation is awaited one at a time; the session is exclusively owned
//! by the run that launched it.

use async_trait::async_trait;

use crate::error::DriverResult;
use crate::locator::Selector;

/// Opaque handle to an element in the current document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    pub id: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Load `url` in the current tab.
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    async fn current_url(&self) -> DriverResult<String>;

    /// First element matching `selector`, or `DriverError::NotFound`.
    async fn find(&self, selector: &Selector) -> DriverResult<ElementHandle>;

    /// All matching elements in document order. Empty is not an error.
    async fn find_all(&self, selector: &Selector) -> DriverResult<Vec<ElementHandle>>;

    /// First descendant of `parent` matching `selector`.
    async fn find_within(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> DriverResult<ElementHandle>;

    async fn click(&self, element: &ElementHandle) -> DriverResult<()>;

    async fn send_text(&self, element: &ElementHandle, text: &str) -> DriverResult<()>;

    async fn attribute(&self, element: &ElementHandle, name: &str) -> DriverResult<Option<String>>;

    async fn text(&self, element: &ElementHandle) -> DriverResult<String>;

    async fn scroll_into_view(&self, element: &ElementHandle) -> DriverResult<()>;

    /// Scroll the window down by `pixels`, triggering lazy-loaded content.
    async fn scroll_by(&self, pixels: i64) -> DriverResult<()>;

    /// End the session and close the browser.
    async fn quit(&self) -> DriverResult<()>;
}

/// Opens authenticated-or-not browser sessions for the run controller.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Driver: PageDriver;

    async fn launch(&self) -> DriverResult<Self::Driver>;
}
