//! Browser session interface consumed by the capture loop.
//!
//! The interception mechanism (a driver proxy, CDP network events, or a
//! recorded HAR) lives behind [`Session`]; the capture loop only needs to
//! scroll, measure, and enumerate the append-only log of issued requests.

pub mod har;

use serde_json::Value;

use crate::error::SessionError;

/// Scrolls the document to its current bottom.
pub const SCROLL_TO_BOTTOM_JS: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Evaluates to the current document height in pixels.
pub const SCROLL_HEIGHT_JS: &str = "return document.body.scrollHeight";

/// A live (or replayed) browser tab.
pub trait Session {
    /// Load `url` in the tab.
    fn navigate(&mut self, url: &str) -> Result<(), SessionError>;

    /// Execute JavaScript in the page and return its value.
    fn run_script(&mut self, script: &str) -> Result<Value, SessionError>;

    /// Every request issued since navigation, in issue order.
    fn exchanges(&self) -> Result<Vec<Exchange>, SessionError>;

    fn scroll_to_bottom(&mut self) -> Result<(), SessionError> {
        self.run_script(SCROLL_TO_BOTTOM_JS).map(|_| ())
    }

    fn scroll_height(&mut self) -> Result<u64, SessionError> {
        let v = self.run_script(SCROLL_HEIGHT_JS)?;
        v.as_u64()
            .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .ok_or_else(|| SessionError::Script(format!("scroll height is not a number: {}", v)))
    }
}

/// One HTTP request issued by the session, with its response once complete.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub method: String,
    pub url: String,
    pub response: Option<ExchangeResponse>,
}

impl Exchange {
    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExchangeResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ExchangeResponse {
    /// First header named `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Declared transport encoding of the body.
    pub fn content_encoding(&self) -> Option<&str> {
        self.header("Content-Encoding")
    }
}
