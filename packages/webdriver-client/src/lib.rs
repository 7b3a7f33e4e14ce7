//! Pure W3C WebDriver REST client.
//!
//! A minimal client for chromedriver-compatible endpoints. Supports opening a
//! session, navigation, element lookup and interaction, and script execution.
//!
//! # Example
//!
//! ```rust,ignore
//! use webdriver_client::{By, ChromeOptions, WebDriverClient};
//!
//! let client = WebDriverClient::new("http://localhost:9515");
//! let session = client.new_session(&ChromeOptions::new()).await?;
//!
//! session.goto("https://example.com").await?;
//! let heading = session.find_element(&By::css("h1")).await?;
//! println!("{}", session.text(&heading).await?);
//!
//! session.delete().await?;
//! ```

pub mod error;
pub mod types;

pub use error::{Result, WebDriverError};
pub use types::{By, ChromeOptions, ElementRef};

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use types::{ApiResponse, ErrorValue, NewSessionValue};

pub const DEFAULT_URL: &str = "http://localhost:9515";

/// Bound on a single command. Navigation blocks until the page loads, so
/// this is generous.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub struct WebDriverClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl WebDriverClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Applies to every command of every session opened afterwards.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open a browser session.
    pub async fn new_session(&self, options: &ChromeOptions) -> Result<Session> {
        let url = format!("{}/session", self.base_url);
        let value: NewSessionValue = send(
            &self.client,
            self.timeout,
            Method::POST,
            &url,
            Some(options.to_capabilities()),
        )
        .await?;

        tracing::info!(session_id = %value.session_id, "WebDriver session opened");

        Ok(Session {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout,
            id: value.session_id,
        })
    }
}

/// An open browser session. Dropping it does not close the browser; call
/// [`Session::delete`].
pub struct Session {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    id: String,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        self.command::<Value>(Method::POST, "url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String> {
        self.command(Method::GET, "url", None).await
    }

    pub async fn find_element(&self, by: &By) -> Result<ElementRef> {
        self.command(Method::POST, "element", Some(json!(by))).await
    }

    pub async fn find_elements(&self, by: &By) -> Result<Vec<ElementRef>> {
        self.command(Method::POST, "elements", Some(json!(by))).await
    }

    /// Find the first descendant of `parent` matching `by`.
    pub async fn find_element_from(&self, parent: &ElementRef, by: &By) -> Result<ElementRef> {
        let path = format!("element/{}/element", parent.id);
        self.command(Method::POST, &path, Some(json!(by))).await
    }

    pub async fn click(&self, element: &ElementRef) -> Result<()> {
        let path = format!("element/{}/click", element.id);
        self.command::<Value>(Method::POST, &path, Some(json!({}))).await?;
        Ok(())
    }

    pub async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<()> {
        let path = format!("element/{}/value", element.id);
        self.command::<Value>(Method::POST, &path, Some(json!({ "text": text })))
            .await?;
        Ok(())
    }

    /// Read an attribute; `None` when the element does not carry it.
    pub async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        let path = format!("element/{}/attribute/{}", element.id, name);
        self.command(Method::GET, &path, None).await
    }

    /// Rendered text of the element.
    pub async fn text(&self, element: &ElementRef) -> Result<String> {
        let path = format!("element/{}/text", element.id);
        self.command(Method::GET, &path, None).await
    }

    /// Run a synchronous script. Element arguments go through [`ElementRef::to_json`].
    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.command(
            Method::POST,
            "execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    pub async fn scroll_into_view(&self, element: &ElementRef) -> Result<()> {
        self.execute(
            "arguments[0].scrollIntoView({block: 'center'});",
            vec![element.to_json()],
        )
        .await?;
        Ok(())
    }

    /// Scroll the window vertically; negative values scroll up.
    pub async fn scroll_by(&self, pixels: i64) -> Result<()> {
        self.execute("window.scrollBy(0, arguments[0]);", vec![json!(pixels)])
            .await?;
        Ok(())
    }

    /// Close the session and the browser it owns.
    pub async fn delete(&self) -> Result<()> {
        let url = format!("{}/session/{}", self.base_url, self.id);
        send::<Value>(&self.client, self.timeout, Method::DELETE, &url, None).await?;
        tracing::info!(session_id = %self.id, "WebDriver session closed");
        Ok(())
    }

    async fn command<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let url = format!("{}/session/{}/{}", self.base_url, self.id, path);
        send(&self.client, self.timeout, method, &url, body).await
    }
}

async fn send<T: DeserializeOwned>(
    client: &reqwest::Client,
    timeout: Duration,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> Result<T> {
    let mut request = client.request(method.clone(), url).timeout(timeout);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let resp = request.send().await?;
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        let (error, message) = match serde_json::from_str::<ApiResponse<ErrorValue>>(&text) {
            Ok(parsed) => (parsed.value.error, parsed.value.message),
            Err(_) => ("unknown error".to_string(), text),
        };
        tracing::debug!(%method, url, status = status.as_u16(), %error, "WebDriver command failed");
        return Err(WebDriverError::Protocol {
            status: status.as_u16(),
            error,
            message,
        });
    }

    serde_json::from_str::<ApiResponse<T>>(&text)
        .map(|r| r.value)
        .map_err(|e| WebDriverError::Parse(format!("{}: {}", e, text)))
}
