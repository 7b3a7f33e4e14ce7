//! Testing utilities including mock implementations.
//!
//! These let the discoverer, orchestrator and run controller be exercised
//! without a browser, a network, or real sleeps.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::{DriverError, DriverResult, GenerationError, GenerationResult};
use crate::locator::{Locator, Locators, Selector};
use crate::pacing::Pause;
use crate::traits::{
    driver::{ElementHandle, PageDriver, SessionLauncher},
    generator::{GenerationRequest, TextGenerator},
    pacer::Pacer,
};

// =============================================================================
// Page driver
// =============================================================================

/// A scripted element.
///
/// Clicking an element appends its `reveals` to the current page, which is how
/// menus and dialogs appear.
#[derive(Debug, Clone, Default)]
pub struct MockElement {
    text: String,
    attributes: HashMap<String, String>,
    children: HashMap<String, Vec<MockElement>>,
    reveals: Vec<(String, MockElement)>,
    click_error: Option<DriverError>,
    read_error: Option<DriverError>,
}

impl MockElement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, selector: &Selector, child: MockElement) -> Self {
        self.children
            .entry(selector.to_string())
            .or_default()
            .push(child);
        self
    }

    /// Make `element` findable under `selector` once this element is clicked.
    pub fn revealing(mut self, selector: &Selector, element: MockElement) -> Self {
        self.reveals.push((selector.to_string(), element));
        self
    }

    pub fn failing_click(mut self, error: DriverError) -> Self {
        self.click_error = Some(error);
        self
    }

    /// Make `text` and `attribute` fail.
    pub fn failing_reads(mut self, error: DriverError) -> Self {
        self.read_error = Some(error);
        self
    }
}

/// A scripted document, keyed by selector.
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    elements: HashMap<String, Vec<MockElement>>,
    lookup_errors: HashMap<String, DriverError>,
    redirect: Option<String>,
    below_fold: Vec<(String, MockElement)>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(mut self, selector: &Selector, element: MockElement) -> Self {
        self.elements
            .entry(selector.to_string())
            .or_default()
            .push(element);
        self
    }

    /// Lookups with `selector` fail with `error` instead of returning elements.
    pub fn with_lookup_error(mut self, selector: &Selector, error: DriverError) -> Self {
        self.lookup_errors.insert(selector.to_string(), error);
        self
    }

    /// `element` only appears once the page has been scrolled.
    pub fn with_element_below_fold(mut self, selector: &Selector, element: MockElement) -> Self {
        self.below_fold.push((selector.to_string(), element));
        self
    }

    /// After navigation, report `url` as the current URL.
    pub fn redirecting_to(mut self, url: impl Into<String>) -> Self {
        self.redirect = Some(url.into());
        self
    }

    /// Logged-in landing page.
    pub fn home(locators: &Locators) -> Self {
        Self::new().with_element(primary(&locators.nav_landmark), MockElement::new(""))
    }

    /// Listing page with one profile anchor per entry. A `None` name produces
    /// an anchor without the nested name node.
    pub fn listing(locators: &Locators, links: &[(&str, Option<&str>)]) -> Self {
        links.iter().fold(Self::new(), |page, (href, name)| {
            page.with_element(primary(&locators.profile_link), profile_link(locators, href, *name))
        })
    }

    /// Adds profile anchors that lazy-load when the listing is scrolled.
    pub fn with_links_below_fold(
        self,
        locators: &Locators,
        links: &[(&str, Option<&str>)],
    ) -> Self {
        links.iter().fold(self, |page, (href, name)| {
            page.with_element_below_fold(
                primary(&locators.profile_link),
                profile_link(locators, href, *name),
            )
        })
    }

    /// Profile whose connect button is visible and whose dialog offers a note.
    pub fn connectable_profile(locators: &Locators) -> Self {
        Self::new().with_element(primary(&locators.connect), connect_button(locators))
    }

    /// Profile whose connect entry is only reachable through the overflow menu.
    pub fn overflow_profile(locators: &Locators) -> Self {
        let more = MockElement::new("More").revealing(
            primary(&locators.connect_in_menu),
            connect_button(locators),
        );
        Self::new().with_element(primary(&locators.more_actions), more)
    }

    /// Profile with no connect control on either path (already connected).
    pub fn connected_profile(locators: &Locators) -> Self {
        let more = MockElement::new("More");
        Self::new().with_element(primary(&locators.more_actions), more)
    }

    /// Profile whose connect dialog has no "add a note" option.
    pub fn profile_without_note(locators: &Locators) -> Self {
        let connect = MockElement::new("Connect")
            .revealing(primary(&locators.send), MockElement::new("Send without a note"));
        Self::new().with_element(primary(&locators.connect), connect)
    }
}

fn primary(locator: &Locator) -> &Selector {
    &locator.strategies[0]
}

fn profile_link(locators: &Locators, href: &str, name: Option<&str>) -> MockElement {
    let link = MockElement::new(name.unwrap_or("Show more")).with_attribute("href", href);
    match name {
        Some(name) => link.with_child(primary(&locators.profile_name), MockElement::new(name)),
        None => link,
    }
}

fn connect_button(locators: &Locators) -> MockElement {
    let add_note = MockElement::new("Add a note")
        .revealing(primary(&locators.note_input), MockElement::new(""))
        .revealing(primary(&locators.send), MockElement::new("Send"));
    MockElement::new("Connect").revealing(primary(&locators.add_note), add_note)
}

/// Record of a call made to the mock driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockDriverCall {
    Navigate { url: String },
    Click { text: String },
    SendText { text: String },
    ScrollIntoView,
    ScrollPage { pixels: i64 },
    Quit,
}

#[derive(Debug, Default)]
struct DriverState {
    current_url: String,
    page: MockPage,
    handles: HashMap<String, MockElement>,
    next_id: usize,
}

impl DriverState {
    fn register(&mut self, element: MockElement) -> ElementHandle {
        self.next_id += 1;
        let id = format!("mock-{}", self.next_id);
        self.handles.insert(id.clone(), element);
        ElementHandle::new(id)
    }

    fn element(&self, handle: &ElementHandle) -> DriverResult<MockElement> {
        self.handles
            .get(&handle.id)
            .cloned()
            .ok_or_else(|| DriverError::Stale(handle.id.clone()))
    }
}

/// A mock page driver over scripted pages.
///
/// Clones share state, so a test can keep one handle while the code under
/// test drives another.
#[derive(Clone, Default)]
pub struct MockPageDriver {
    pages: Arc<RwLock<HashMap<String, MockPage>>>,
    navigate_errors: Arc<RwLock<HashMap<String, DriverError>>>,
    state: Arc<RwLock<DriverState>>,
    calls: Arc<RwLock<Vec<MockDriverCall>>>,
}

impl MockPageDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `page` when navigating to `url`. Unknown URLs load an empty page.
    pub fn with_page(self, url: impl Into<String>, page: MockPage) -> Self {
        self.pages.write().unwrap().insert(url.into(), page);
        self
    }

    pub fn with_navigate_error(self, url: impl Into<String>, error: DriverError) -> Self {
        self.navigate_errors
            .write()
            .unwrap()
            .insert(url.into(), error);
        self
    }

    pub fn calls(&self) -> Vec<MockDriverCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockDriverCall::Navigate { url } => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn clicked(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockDriverCall::Click { text } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Text typed into any element, in order.
    pub fn typed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockDriverCall::SendText { text } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn quit_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == MockDriverCall::Quit)
            .count()
    }

    fn record(&self, call: MockDriverCall) {
        self.calls.write().unwrap().push(call);
    }
}

#[async_trait]
impl PageDriver for MockPageDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        self.record(MockDriverCall::Navigate {
            url: url.to_string(),
        });

        if let Some(error) = self.navigate_errors.read().unwrap().get(url) {
            return Err(error.clone());
        }

        let page = self
            .pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default();

        let mut state = self.state.write().unwrap();
        state.current_url = page.redirect.clone().unwrap_or_else(|| url.to_string());
        state.page = page;
        state.handles.clear();
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.state.read().unwrap().current_url.clone())
    }

    async fn find(&self, selector: &Selector) -> DriverResult<ElementHandle> {
        self.find_all(selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::not_found(selector))
    }

    async fn find_all(&self, selector: &Selector) -> DriverResult<Vec<ElementHandle>> {
        let key = selector.to_string();
        let mut state = self.state.write().unwrap();

        if let Some(error) = state.page.lookup_errors.get(&key) {
            return Err(error.clone());
        }

        let elements = state.page.elements.get(&key).cloned().unwrap_or_default();
        Ok(elements.into_iter().map(|e| state.register(e)).collect())
    }

    async fn find_within(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> DriverResult<ElementHandle> {
        let mut state = self.state.write().unwrap();
        let parent = state.element(parent)?;
        let child = parent
            .children
            .get(&selector.to_string())
            .and_then(|c| c.first().cloned())
            .ok_or_else(|| DriverError::not_found(selector))?;
        Ok(state.register(child))
    }

    async fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        let mut state = self.state.write().unwrap();
        let element = state.element(element)?;
        self.record(MockDriverCall::Click {
            text: element.text.clone(),
        });

        if let Some(error) = &element.click_error {
            return Err(error.clone());
        }

        for (key, revealed) in element.reveals {
            state.page.elements.entry(key).or_default().push(revealed);
        }
        Ok(())
    }

    async fn send_text(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        self.state.read().unwrap().element(element)?;
        self.record(MockDriverCall::SendText {
            text: text.to_string(),
        });
        Ok(())
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> DriverResult<Option<String>> {
        let element = self.state.read().unwrap().element(element)?;
        if let Some(error) = element.read_error {
            return Err(error);
        }
        Ok(element.attributes.get(name).cloned())
    }

    async fn text(&self, element: &ElementHandle) -> DriverResult<String> {
        let element = self.state.read().unwrap().element(element)?;
        if let Some(error) = element.read_error {
            return Err(error);
        }
        Ok(element.text)
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> DriverResult<()> {
        self.state.read().unwrap().element(element)?;
        self.record(MockDriverCall::ScrollIntoView);
        Ok(())
    }

    async fn scroll_by(&self, pixels: i64) -> DriverResult<()> {
        self.record(MockDriverCall::ScrollPage { pixels });
        let mut state = self.state.write().unwrap();
        let revealed = std::mem::take(&mut state.page.below_fold);
        for (key, element) in revealed {
            state.page.elements.entry(key).or_default().push(element);
        }
        Ok(())
    }

    async fn quit(&self) -> DriverResult<()> {
        self.record(MockDriverCall::Quit);
        Ok(())
    }
}

/// Hands out clones of one [`MockPageDriver`].
#[derive(Clone, Default)]
pub struct MockLauncher {
    driver: MockPageDriver,
    launch_error: Option<DriverError>,
    launches: Arc<AtomicUsize>,
}

impl MockLauncher {
    pub fn new(driver: MockPageDriver) -> Self {
        Self {
            driver,
            ..Default::default()
        }
    }

    pub fn failing(error: DriverError) -> Self {
        Self {
            launch_error: Some(error),
            ..Default::default()
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionLauncher for MockLauncher {
    type Driver = MockPageDriver;

    async fn launch(&self) -> DriverResult<MockPageDriver> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        match &self.launch_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.driver.clone()),
        }
    }
}

// =============================================================================
// Text generation
// =============================================================================

pub const MOCK_REPLY: &str =
    "Hi [First Name], I'd love to connect and hear how you got started in your role.";

/// A mock text generator with scripted replies.
///
/// Queued replies are used first, then the default reply.
pub struct MockTextGenerator {
    queued: Arc<RwLock<VecDeque<GenerationResult<String>>>>,
    default_reply: GenerationResult<String>,
    requests: Arc<RwLock<Vec<GenerationRequest>>>,
}

impl Default for MockTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self::replying(MOCK_REPLY)
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            queued: Arc::default(),
            default_reply: Ok(text.into()),
            requests: Arc::default(),
        }
    }

    pub fn failing(error: GenerationError) -> Self {
        Self {
            queued: Arc::default(),
            default_reply: Err(error),
            requests: Arc::default(),
        }
    }

    pub fn then(self, reply: GenerationResult<String>) -> Self {
        self.queued.write().unwrap().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.read().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult<String> {
        self.requests.write().unwrap().push(request.clone());
        self.queued
            .write()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// =============================================================================
// Pacing
// =============================================================================

/// Records pauses instead of sleeping.
#[derive(Clone, Default)]
pub struct RecordingPacer {
    pauses: Arc<RwLock<Vec<Pause>>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> Vec<Pause> {
        self.pauses.read().unwrap().clone()
    }

    pub fn count(&self, pause: Pause) -> usize {
        self.pauses().iter().filter(|p| **p == pause).count()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, pause: Pause) {
        self.pauses.write().unwrap().push(pause);
    }
}

// =============================================================================
// Network
// =============================================================================

/// Base URL of a server that accepts connections and never answers.
pub async fn silent_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}
