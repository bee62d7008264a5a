//! Scroll-driven capture of a paginated feed from intercepted traffic.
//!
//! The loop scrolls the session, inspects every request it has issued so
//! far, and decodes each new matching response exactly once. Deduplication
//! is by request URL: a URL is marked observed before it is decoded and is
//! never looked at again, whatever the decode outcome.

pub mod state;

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::config::FeedvaultConfig;
use crate::decode;
use crate::error::SessionError;
use crate::model::{FeedRecord, ProfileInfo};
use crate::session::{Exchange, Session};

pub use state::{CapturePhase, CycleSignals};

/// Inputs of one capture run.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Substring identifying the feed endpoint.
    pub api_fragment: String,
    pub idle_timeout: Duration,
    pub poll_interval: Duration,
}

impl CaptureOptions {
    pub fn from_config(cfg: &FeedvaultConfig) -> Self {
        Self {
            api_fragment: cfg.api_fragment.clone(),
            idle_timeout: cfg.idle_timeout(),
            poll_interval: cfg.poll_interval(),
        }
    }
}

/// Result of a finished capture.
#[derive(Debug, Clone, Default)]
pub struct CaptureOutcome {
    /// Records in arrival order.
    pub records: Vec<FeedRecord>,
    /// Profile carried by the first captured record that has one.
    pub profile: Option<ProfileInfo>,
    /// Distinct matching URLs observed.
    pub observed_urls: usize,
    /// Poll cycles run.
    pub cycles: usize,
}

/// What ingesting one exchange list changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleIngest {
    /// Matching URLs seen for the first time.
    pub observed: usize,
    /// Of those, envelopes that decoded and reported success.
    pub succeeded: usize,
    /// Records appended.
    pub records_added: usize,
}

impl CycleIngest {
    pub fn new_data(&self) -> bool {
        self.succeeded > 0
    }
}

/// Mutable state owned by one capture run.
#[derive(Debug)]
pub struct CaptureSession {
    observed: HashSet<String>,
    records: Vec<FeedRecord>,
    seen_item_ids: HashSet<String>,
    last_observation: Instant,
    last_height: u64,
    cycles: usize,
}

impl CaptureSession {
    pub fn new(initial_height: u64, now: Instant) -> Self {
        Self {
            observed: HashSet::new(),
            records: Vec::new(),
            seen_item_ids: HashSet::new(),
            last_observation: now,
            last_height: initial_height,
            cycles: 0,
        }
    }

    pub fn is_observed(&self, url: &str) -> bool {
        self.observed.contains(url)
    }

    pub fn records(&self) -> &[FeedRecord] {
        &self.records
    }

    /// Decodes every unobserved, completed GET whose URL contains `filter`.
    pub fn ingest(&mut self, exchanges: &[Exchange], filter: &str, now: Instant) -> CycleIngest {
        let mut out = CycleIngest::default();
        for exchange in exchanges {
            if !exchange.is_get() || !exchange.url.contains(filter) {
                continue;
            }
            let Some(response) = exchange.response.as_ref() else {
                continue;
            };
            if !self.observed.insert(exchange.url.clone()) {
                continue;
            }
            out.observed += 1;
            self.last_observation = now;

            let envelope = match decode::decode(&response.body, response.content_encoding()) {
                Ok(env) => env,
                Err(e) => {
                    tracing::warn!(
                        url = %exchange.url,
                        encoding = response.content_encoding().unwrap_or("identity"),
                        kind = ?e.kind(),
                        "skipping undecodable response: {}",
                        e
                    );
                    continue;
                }
            };
            if !envelope.is_success() {
                tracing::warn!(
                    url = %exchange.url,
                    code = envelope.code,
                    "feed endpoint returned an error: {}",
                    envelope.message.as_deref().unwrap_or("unknown error")
                );
                continue;
            }

            out.succeeded += 1;
            let mut added = 0;
            for (index, record) in envelope.data.records().enumerate() {
                let record = match record {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!(url = %exchange.url, index, "skipping malformed record: {}", e);
                        continue;
                    }
                };
                if !record.item.id.is_empty() && !self.seen_item_ids.insert(record.item.id.clone()) {
                    tracing::debug!(item_id = %record.item.id, url = %exchange.url, "item seen on an earlier page");
                }
                self.records.push(record);
                added += 1;
            }
            out.records_added += added;
            tracing::info!(
                url = %exchange.url,
                page = added,
                total = self.records.len(),
                "captured feed page"
            );
        }
        out
    }

    /// Ends a cycle: compares the height with the previous cycle and checks the idle clock.
    pub fn close_cycle(
        &mut self,
        height: u64,
        new_data: bool,
        now: Instant,
        idle_timeout: Duration,
    ) -> CycleSignals {
        self.cycles += 1;
        let height_changed = height != self.last_height;
        self.last_height = height;
        CycleSignals::evaluate(
            new_data,
            height_changed,
            now.saturating_duration_since(self.last_observation),
            idle_timeout,
        )
    }

    pub fn finish(self) -> CaptureOutcome {
        let profile = self.records.iter().find_map(|r| r.user.clone());
        CaptureOutcome {
            records: self.records,
            profile,
            observed_urls: self.observed.len(),
            cycles: self.cycles,
        }
    }
}

/// Drives `session` until the feed stops producing data.
///
/// Only session failures are errors; undecodable or failed responses are
/// logged and skipped. An empty outcome is valid.
pub fn capture<S: Session + ?Sized>(
    session: &mut S,
    opts: &CaptureOptions,
) -> Result<CaptureOutcome, SessionError> {
    let initial_height = session.scroll_height()?;
    let mut state = CaptureSession::new(initial_height, Instant::now());
    let mut phase = CapturePhase::Scrolling;
    let mut ingest = CycleIngest::default();
    let mut signals = CycleSignals::default();

    tracing::info!(filter = %opts.api_fragment, "capture started");
    loop {
        match phase {
            CapturePhase::Scrolling => session.scroll_to_bottom()?,
            CapturePhase::AwaitingData => {
                let exchanges = session.exchanges()?;
                ingest = state.ingest(&exchanges, &opts.api_fragment, Instant::now());
            }
            CapturePhase::IdleCheck => {
                let height = session.scroll_height()?;
                signals = state.close_cycle(height, ingest.new_data(), Instant::now(), opts.idle_timeout);
            }
            CapturePhase::Done => break,
        }
        let next = phase.advance(signals);
        if phase == CapturePhase::IdleCheck && next == CapturePhase::Scrolling {
            std::thread::sleep(opts.poll_interval);
        }
        phase = next;
    }

    let outcome = state.finish();
    tracing::info!(
        records = outcome.records.len(),
        urls = outcome.observed_urls,
        cycles = outcome.cycles,
        "capture finished"
    );
    Ok(outcome)
}
