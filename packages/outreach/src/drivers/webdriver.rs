//! [`PageDriver`] over a W3C WebDriver session (chromedriver).
//!
//! The browser runs with a persistent profile directory so that an existing
//! logged-in session is reused; nothing here ever enters credentials.

use async_trait::async_trait;
use tracing::{debug, info};
use webdriver_client::{By, ChromeOptions, ElementRef, Session, WebDriverClient, WebDriverError};

use crate::config::BrowserSettings;
use crate::error::{DriverError, DriverResult};
use crate::locator::Selector;
use crate::traits::driver::{ElementHandle, PageDriver, SessionLauncher};

impl From<WebDriverError> for DriverError {
    fn from(err: WebDriverError) -> Self {
        if err.is_stale() {
            return Self::Stale(err.to_string());
        }
        if err.is_click_intercepted() {
            return Self::Intercepted(err.to_string());
        }
        match err {
            WebDriverError::Http(e) => Self::Session(e.to_string()),
            other => Self::Protocol(other.to_string()),
        }
    }
}

/// Lookups report a miss as [`DriverError::NotFound`] naming the selector.
fn lookup_error(err: WebDriverError, selector: &Selector) -> DriverError {
    if err.is_no_such_element() {
        DriverError::not_found(selector)
    } else {
        err.into()
    }
}

fn by(selector: &Selector) -> By {
    match selector {
        Selector::Css(css) => By::css(css),
        Selector::XPath(xpath) => By::xpath(xpath),
        Selector::Id(id) => By::id(id),
    }
}

fn element(handle: &ElementHandle) -> ElementRef {
    ElementRef::new(&handle.id)
}

fn handle(element: ElementRef) -> ElementHandle {
    ElementHandle::new(element.id)
}

pub struct WebDriverPageDriver {
    session: Session,
}

impl WebDriverPageDriver {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl PageDriver for WebDriverPageDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        debug!(url, "Navigating");
        Ok(self.session.goto(url).await?)
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.session.current_url().await?)
    }

    async fn find(&self, selector: &Selector) -> DriverResult<ElementHandle> {
        self.session
            .find_element(&by(selector))
            .await
            .map(handle)
            .map_err(|e| lookup_error(e, selector))
    }

    async fn find_all(&self, selector: &Selector) -> DriverResult<Vec<ElementHandle>> {
        let elements = self
            .session
            .find_elements(&by(selector))
            .await
            .map_err(|e| lookup_error(e, selector))?;
        Ok(elements.into_iter().map(handle).collect())
    }

    async fn find_within(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> DriverResult<ElementHandle> {
        self.session
            .find_element_from(&element(parent), &by(selector))
            .await
            .map(handle)
            .map_err(|e| lookup_error(e, selector))
    }

    async fn click(&self, target: &ElementHandle) -> DriverResult<()> {
        Ok(self.session.click(&element(target)).await?)
    }

    async fn send_text(&self, target: &ElementHandle, text: &str) -> DriverResult<()> {
        Ok(self.session.send_keys(&element(target), text).await?)
    }

    async fn attribute(&self, target: &ElementHandle, name: &str) -> DriverResult<Option<String>> {
        Ok(self.session.attribute(&element(target), name).await?)
    }

    async fn text(&self, target: &ElementHandle) -> DriverResult<String> {
        Ok(self.session.text(&element(target)).await?)
    }

    async fn scroll_into_view(&self, target: &ElementHandle) -> DriverResult<()> {
        Ok(self.session.scroll_into_view(&element(target)).await?)
    }

    async fn scroll_by(&self, pixels: i64) -> DriverResult<()> {
        Ok(self.session.scroll_by(pixels).await?)
    }

    async fn quit(&self) -> DriverResult<()> {
        Ok(self.session.delete().await?)
    }
}

/// Opens Chromium-family sessions through a running chromedriver.
pub struct WebDriverLauncher {
    client: WebDriverClient,
    options: ChromeOptions,
}

impl WebDriverLauncher {
    pub fn new(settings: &BrowserSettings) -> Self {
        Self {
            client: WebDriverClient::new(&settings.webdriver_url)
                .with_timeout(settings.command_timeout),
            options: chrome_options(settings),
        }
    }
}

#[async_trait]
impl SessionLauncher for WebDriverLauncher {
    type Driver = WebDriverPageDriver;

    async fn launch(&self) -> DriverResult<WebDriverPageDriver> {
        info!(webdriver = self.client.base_url(), "Starting browser session");
        let session = self
            .client
            .new_session(&self.options)
            .await
            .map_err(|e| DriverError::Session(e.to_string()))?;
        Ok(WebDriverPageDriver::new(session))
    }
}

fn chrome_options(settings: &BrowserSettings) -> ChromeOptions {
    let mut options = ChromeOptions::new()
        .arg("--disable-notifications")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .exclude_switch("enable-automation");

    if let Some(binary) = &settings.binary {
        options = options.binary(binary);
    }
    if let Some(dir) = &settings.profile_dir {
        options = options
            .arg(format!("--user-data-dir={}", dir.display()))
            .arg("--profile-directory=Default");
    }
    if settings.headless {
        options = options.arg("--headless=new");
    }
    options
}
