//! Browser capability interface the site adapters are written against

pub mod webdriver;

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

pub use webdriver::{WebDriverLauncher, WebDriverSession};

/// How to find an element on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(String),
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn id(value: impl Into<String>) -> Self {
        Locator::Id(value.into())
    }

    pub fn css(value: impl Into<String>) -> Self {
        Locator::Css(value.into())
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Locator::XPath(value.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "#{}", id),
            Locator::Css(css) => write!(f, "css={}", css),
            Locator::XPath(xpath) => write!(f, "xpath={}", xpath),
        }
    }
}

/// UI state to wait for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// At least one match exists in the DOM
    Present(Locator),
    /// First match is displayed
    Visible(Locator),
    /// First match is displayed and enabled
    Clickable(Locator),
    /// At least `n` matches exist
    AtLeast(Locator, usize),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Present(l) => write!(f, "{} present", l),
            Condition::Visible(l) => write!(f, "{} visible", l),
            Condition::Clickable(l) => write!(f, "{} clickable", l),
            Condition::AtLeast(l, n) => write!(f, "at least {} of {}", n, l),
        }
    }
}

/// Non-printing keys, sent through `type_text` as WebDriver key code points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    ArrowDown,
}

impl Key {
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::Enter => "\u{E007}",
            Key::ArrowDown => "\u{E015}",
        }
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("WebDriver request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver error '{error}': {message}")]
    Protocol { error: String, message: String },

    #[error("No element matches {0}")]
    NoSuchElement(String),

    #[error("Timed out after {secs:.1}s waiting for {condition}")]
    Timeout { condition: String, secs: f64 },

    #[error("Malformed WebDriver response: {0}")]
    Malformed(String),

    #[error("Browser session already closed")]
    Closed,
}

/// Capabilities a site adapter needs from an automated browser.
pub trait BrowserDriver {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    fn find_and_click(&mut self, locator: &Locator) -> Result<(), DriverError>;

    /// Send keystrokes to the first match. `Key::as_str` values are allowed.
    fn type_text(&mut self, locator: &Locator, text: &str) -> Result<(), DriverError>;

    /// Empty an input field
    fn clear(&mut self, locator: &Locator) -> Result<(), DriverError>;

    /// Evaluate a condition once
    fn check(&mut self, condition: &Condition) -> Result<bool, DriverError>;

    fn count(&mut self, locator: &Locator) -> Result<usize, DriverError>;

    fn scroll_by(&mut self, pixels: u32) -> Result<(), DriverError>;

    fn viewport_height(&mut self) -> Result<u32, DriverError>;

    fn read_text(&mut self, locator: &Locator) -> Result<String, DriverError>;

    /// Texts of every `field` match inside the `index`-th `card` match
    fn card_texts(
        &mut self,
        card: &Locator,
        index: usize,
        field: &Locator,
    ) -> Result<Vec<String>, DriverError>;

    fn close_session(&mut self) -> Result<(), DriverError>;

    /// Poll `check` until it holds or `timeout` elapses.
    ///
    /// Errors from individual checks count as "not yet".
    fn wait_until(
        &mut self,
        condition: &Condition,
        timeout: Duration,
        poll: Duration,
    ) -> Result<(), DriverError> {
        let start = Instant::now();
        loop {
            match self.check(condition) {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) => tracing::debug!(%condition, error = %e, "condition check failed"),
            }
            if start.elapsed() >= timeout {
                return Err(DriverError::Timeout {
                    condition: condition.to_string(),
                    secs: timeout.as_secs_f64(),
                });
            }
            thread::sleep(poll);
        }
    }
}

/// Starts a fresh browser session per adapter run
pub trait Launcher {
    type Driver: BrowserDriver;

    fn launch(&self) -> Result<Self::Driver, DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubDriver;

    #[test]
    fn test_wait_until_times_out() {
        let mut driver = StubDriver::new().without(Locator::css("div.never"));
        let missing = Condition::Present(Locator::css("div.never"));

        let err = driver
            .wait_until(&missing, Duration::from_millis(30), Duration::from_millis(5))
            .unwrap_err();
        assert!(matches!(err, DriverError::Timeout { .. }));
        assert!(err.to_string().contains("div.never"));
    }

    #[test]
    fn test_wait_until_immediate() {
        let mut driver = StubDriver::new();
        let ready = Condition::Clickable(Locator::id("rc_select_0"));
        assert!(driver
            .wait_until(&ready, Duration::from_millis(30), Duration::from_millis(5))
            .is_ok());
    }

    #[test]
    fn test_locator_display() {
        assert_eq!(Locator::id("from").to_string(), "#from");
        assert_eq!(Locator::css("div.a").to_string(), "css=div.a");
        assert_eq!(Locator::xpath("//div").to_string(), "xpath=//div");
    }
}
