//! Locator strategies for UI controls.
//!
//! Each logical control is a [`Locator`]: a name plus an ordered list of
//! selectors tried until one matches. Adding a fallback path for a control is
//! a change to [`Locators`], never to the orchestration code.

use std::fmt;

use tracing::debug;

use crate::error::DriverResult;
use crate::traits::driver::{ElementHandle, PageDriver};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Css(String),
    XPath(String),
    /// Element id, without the leading `#`.
    Id(String),
}

impl Selector {
    pub fn css(value: impl Into<String>) -> Self {
        Self::Css(value.into())
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::XPath(value.into())
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::Id(value.into())
    }

    /// XPath matching a `tag` whose text content contains `text`.
    pub fn containing_text(tag: &str, text: &str) -> Self {
        Self::XPath(format!("//{}[contains(., '{}')]", tag, text))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(v) => write!(f, "css:{}", v),
            Self::XPath(v) => write!(f, "xpath:{}", v),
            Self::Id(v) => write!(f, "id:{}", v),
        }
    }
}

/// A named control with ordered fallback selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub name: String,
    pub strategies: Vec<Selector>,
}

impl Locator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategies: Vec::new(),
        }
    }

    pub fn or(mut self, selector: Selector) -> Self {
        self.strategies.push(selector);
        self
    }

    /// First selector that finds something. `Ok(None)` when every strategy
    /// reports not-found; any other driver error propagates.
    pub async fn locate<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
    ) -> DriverResult<Option<ElementHandle>> {
        for selector in &self.strategies {
            match driver.find(selector).await {
                Ok(element) => {
                    debug!(control = %self.name, %selector, "Located control");
                    return Ok(Some(element));
                }
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Like [`Locator::locate`], scoped to descendants of `parent`.
    pub async fn locate_within<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        parent: &ElementHandle,
    ) -> DriverResult<Option<ElementHandle>> {
        for selector in &self.strategies {
            match driver.find_within(parent, selector).await {
                Ok(element) => return Ok(Some(element)),
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Every element matched by the first strategy that matches anything.
    pub async fn locate_all<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
    ) -> DriverResult<Vec<ElementHandle>> {
        for selector in &self.strategies {
            let elements = driver.find_all(selector).await?;
            if !elements.is_empty() {
                debug!(control = %self.name, %selector, count = elements.len(), "Located elements");
                return Ok(elements);
            }
        }
        Ok(Vec::new())
    }
}

/// Every control the discoverer, orchestrator and session check look for.
#[derive(Debug, Clone)]
pub struct Locators {
    /// Profile anchors on the listing page
    pub profile_link: Locator,
    /// Name text nested inside a profile anchor
    pub profile_name: Locator,
    /// Landmark only present for a logged-in session
    pub nav_landmark: Locator,
    pub connect: Locator,
    pub more_actions: Locator,
    /// Connect entry inside the expanded overflow menu
    pub connect_in_menu: Locator,
    pub add_note: Locator,
    pub note_input: Locator,
    pub send: Locator,
}

impl Default for Locators {
    fn default() -> Self {
        Self {
            profile_link: Locator::new("profile link")
                .or(Selector::css("a.ember-view.link-without-visited-state.t-bold"))
                .or(Selector::css("a[href*=\"/in/\"]")),
            profile_name: Locator::new("profile name")
                .or(Selector::css("span[aria-hidden=\"true\"]"))
                .or(Selector::css("div.artdeco-entity-lockup__title")),
            nav_landmark: Locator::new("global nav").or(Selector::id("global-nav")),
            connect: Locator::new("connect")
                .or(Selector::containing_text("button", "Connect")),
            more_actions: Locator::new("more actions")
                .or(Selector::containing_text("button", "More")),
            connect_in_menu: Locator::new("connect in menu")
                .or(Selector::xpath("//div[contains(., 'Connect')]/button"))
                .or(Selector::containing_text("div[@role='button']", "Connect")),
            add_note: Locator::new("add a note")
                .or(Selector::containing_text("button", "Add a note")),
            note_input: Locator::new("note input").or(Selector::id("custom-message")),
            send: Locator::new("send").or(Selector::containing_text("button", "Send")),
        }
    }
}
