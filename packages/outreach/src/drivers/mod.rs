//! Page drivers backed by a real browser.

pub mod webdriver;

pub use webdriver::{WebDriverLauncher, WebDriverPageDriver};
