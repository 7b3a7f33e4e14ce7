use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Key under which W3C drivers serialize element references.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Wrapper for every WebDriver response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub value: T,
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorValue {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSessionValue {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub capabilities: Value,
}

/// Opaque reference to a node in the remote document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    pub id: String,
}

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// JSON form used when passing the element as a script argument.
    pub fn to_json(&self) -> Value {
        json!({ ELEMENT_KEY: self.id })
    }
}

/// Element lookup strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct By {
    pub using: &'static str,
    pub value: String,
}

impl By {
    pub fn css(value: impl Into<String>) -> Self {
        Self {
            using: "css selector",
            value: value.into(),
        }
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self {
            using: "xpath",
            value: value.into(),
        }
    }

    /// W3C dropped the `id` strategy; an attribute selector covers it.
    pub fn id(value: impl AsRef<str>) -> Self {
        Self::css(format!("[id=\"{}\"]", value.as_ref()))
    }
}

/// Chromium-family launch options (`goog:chromeOptions`).
///
/// Works for Chrome, Chromium and Brave since they share chromedriver.
#[derive(Debug, Clone, Default)]
pub struct ChromeOptions {
    pub binary: Option<String>,
    pub args: Vec<String>,
    pub exclude_switches: Vec<String>,
}

impl ChromeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn binary(mut self, path: impl Into<String>) -> Self {
        self.binary = Some(path.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn exclude_switch(mut self, switch: impl Into<String>) -> Self {
        self.exclude_switches.push(switch.into());
        self
    }

    /// Full new-session request body.
    pub fn to_capabilities(&self) -> Value {
        let mut chrome = json!({
            "args": self.args,
            "excludeSwitches": self.exclude_switches,
        });
        if let Some(binary) = &self.binary {
            chrome["binary"] = Value::String(binary.clone());
        }

        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": chrome,
                }
            }
        })
    }
}
