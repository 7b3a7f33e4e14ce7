use thiserror::Error;

pub type Result<T> = std::result::Result<T, WebDriverError>;

/// W3C error code for a lookup that matched nothing.
pub const NO_SUCH_ELEMENT: &str = "no such element";
/// W3C error code for a handle whose node left the document.
pub const STALE_ELEMENT: &str = "stale element reference";
/// W3C error code for a click that landed on another element.
pub const CLICK_INTERCEPTED: &str = "element click intercepted";

#[derive(Debug, Error)]
pub enum WebDriverError {
    /// Transport failure talking to the driver process
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The driver answered with a W3C error payload
    #[error("{error} ({status}): {message}")]
    Protocol {
        status: u16,
        error: String,
        message: String,
    },

    /// The driver answered with something that is not a W3C payload
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WebDriverError {
    /// W3C error code, when the driver supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Protocol { error, .. } => Some(error.as_str()),
            _ => None,
        }
    }

    pub fn is_no_such_element(&self) -> bool {
        self.code() == Some(NO_SUCH_ELEMENT)
    }

    pub fn is_stale(&self) -> bool {
        self.code() == Some(STALE_ELEMENT)
    }

    pub fn is_click_intercepted(&self) -> bool {
        self.code() == Some(CLICK_INTERCEPTED)
    }
}
