//! Replay of a recorded browsing session from HAR (HTTP Archive 1.2) exports.
//!
//! Navigating selects the entries recorded for that page. Requests become
//! visible progressively: the first batch on navigation, one more batch per
//! scroll, and the page grows taller with every batch, the way an
//! infinite-scroll feed behaves in a live tab.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use super::{Exchange, ExchangeResponse, Session};
use crate::error::SessionError;

/// Entries revealed per scroll unless configured otherwise.
pub const DEFAULT_ENTRIES_PER_SCROLL: usize = 4;

const BASE_HEIGHT: u64 = 1080;
const HEIGHT_PER_ENTRY: u64 = 720;

#[derive(Debug, Deserialize)]
struct HarLog {
    log: HarRoot,
}

#[derive(Debug, Deserialize)]
struct HarRoot {
    #[serde(default)]
    pages: Vec<HarPage>,
    entries: Vec<HarEntry>,
}

#[derive(Debug, Deserialize)]
struct HarPage {
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct HarEntry {
    #[serde(default)]
    pageref: Option<String>,
    request: HarRequest,
    response: HarResponse,
}

#[derive(Debug, Deserialize)]
struct HarRequest {
    #[serde(default = "default_method")]
    method: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct HarResponse {
    #[serde(default)]
    status: u16,
    #[serde(default)]
    headers: Vec<HarHeader>,
    #[serde(default)]
    content: HarContent,
}

#[derive(Debug, Deserialize)]
struct HarHeader {
    name: String,
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct HarContent {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Debug, Clone)]
struct RecordedPage {
    id: String,
    title: String,
}

#[derive(Debug, Clone)]
struct RecordedExchange {
    pageref: Option<String>,
    exchange: Exchange,
}

/// [`Session`] backed by one or more HAR files.
#[derive(Debug)]
pub struct HarSession {
    pages: Vec<RecordedPage>,
    entries: Vec<RecordedExchange>,
    /// Indices into `entries` for the current page.
    active: Vec<usize>,
    revealed: usize,
    entries_per_scroll: usize,
}

impl HarSession {
    /// Loads a single HAR file.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_all(&[path])
    }

    /// Loads several HAR files into one session; page ids are namespaced per file.
    pub fn open_all<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut session = Self::empty();
        for (file_index, path) in paths.iter().enumerate() {
            let path = path.as_ref();
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read HAR file: {}", path.display()))?;
            session
                .load(&text, &format!("f{}:", file_index))
                .with_context(|| format!("parse HAR file: {}", path.display()))?;
        }
        Ok(session)
    }

    /// Parses HAR JSON held in memory.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut session = Self::empty();
        session.load(text, "")?;
        Ok(session)
    }

    pub fn with_entries_per_scroll(mut self, n: usize) -> Self {
        self.entries_per_scroll = n.max(1);
        self
    }

    /// Number of recorded requests across all pages.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn empty() -> Self {
        Self {
            pages: Vec::new(),
            entries: Vec::new(),
            active: Vec::new(),
            revealed: 0,
            entries_per_scroll: DEFAULT_ENTRIES_PER_SCROLL,
        }
    }

    fn load(&mut self, text: &str, page_prefix: &str) -> Result<()> {
        let har: HarLog = serde_json::from_str(text).context("invalid HAR JSON")?;
        for page in har.log.pages {
            self.pages.push(RecordedPage {
                id: format!("{}{}", page_prefix, page.id),
                title: page.title,
            });
        }
        for (i, entry) in har.log.entries.into_iter().enumerate() {
            let exchange = to_exchange(entry.request, entry.response)
                .with_context(|| format!("HAR entry {}", i))?;
            self.entries.push(RecordedExchange {
                pageref: entry.pageref.map(|p| format!("{}{}", page_prefix, p)),
                exchange,
            });
        }
        Ok(())
    }

    fn reveal_next_batch(&mut self) {
        self.revealed = (self.revealed + self.entries_per_scroll).min(self.active.len());
    }

    fn height(&self) -> u64 {
        BASE_HEIGHT + HEIGHT_PER_ENTRY * self.revealed as u64
    }
}

fn to_exchange(request: HarRequest, response: HarResponse) -> Result<Exchange> {
    // Status 0 marks a request that never completed in the recording.
    let response = if response.status == 0 {
        None
    } else {
        let body = match (response.content.text, response.content.encoding.as_deref()) {
            (Some(text), Some(enc)) if enc.eq_ignore_ascii_case("base64") => STANDARD
                .decode(text.trim())
                .context("response body is not valid base64")?,
            (Some(text), _) => text.into_bytes(),
            (None, _) => Vec::new(),
        };
        Some(ExchangeResponse {
            status: response.status,
            headers: response
                .headers
                .into_iter()
                .map(|h| (h.name, h.value))
                .collect(),
            body,
        })
    };
    Ok(Exchange {
        method: request.method,
        url: request.url,
        response,
    })
}

fn same_page(title: &str, url: &str) -> bool {
    title == url || title.trim_end_matches('/') == url.trim_end_matches('/')
}

impl Session for HarSession {
    fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        self.active = if self.pages.is_empty() {
            (0..self.entries.len()).collect()
        } else {
            let page_ids: Vec<&str> = self
                .pages
                .iter()
                .filter(|p| same_page(&p.title, url))
                .map(|p| p.id.as_str())
                .collect();
            if page_ids.is_empty() {
                return Err(SessionError::Navigate {
                    url: url.to_string(),
                    reason: "no recorded page for this URL".to_string(),
                });
            }
            self.entries
                .iter()
                .enumerate()
                .filter(|(_, e)| {
                    e.pageref
                        .as_deref()
                        .map_or(false, |r| page_ids.contains(&r))
                })
                .map(|(i, _)| i)
                .collect()
        };
        self.revealed = 0;
        self.reveal_next_batch();
        tracing::debug!(url, entries = self.active.len(), "replaying recorded page");
        Ok(())
    }

    fn run_script(&mut self, script: &str) -> Result<Value, SessionError> {
        Err(SessionError::Script(format!(
            "HAR replay cannot evaluate scripts: {}",
            script
        )))
    }

    fn exchanges(&self) -> Result<Vec<Exchange>, SessionError> {
        Ok(self.active[..self.revealed]
            .iter()
            .map(|&i| self.entries[i].exchange.clone())
            .collect())
    }

    fn scroll_to_bottom(&mut self) -> Result<(), SessionError> {
        self.reveal_next_batch();
        Ok(())
    }

    fn scroll_height(&mut self) -> Result<u64, SessionError> {
        Ok(self.height())
    }
}
