//! Single-file download engine.
//!
//! `fetch` is idempotent: a destination that already exists with non-zero
//! size is reported as done without touching the network. That check is the
//! only resume mechanism in the pipeline; a failed fetch leaves nothing
//! behind and is simply attempted again on the next run.

mod transfer;

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::FetchError;
use crate::storage::{self, PartialFile};

/// Transfer limits applied to every curl handle.
#[derive(Debug, Clone)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for CurlOptions {
    fn default() -> Self {
        CurlOptions::from(&HttpConfig::default())
    }
}

impl From<&HttpConfig> for CurlOptions {
    fn from(cfg: &HttpConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            low_speed_limit: cfg.low_speed_limit,
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            user_agent: cfg.user_agent.clone(),
        }
    }
}

/// What a successful `fetch` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Destination was already complete; no request was made.
    Skipped,
    /// Body was downloaded and moved into place.
    Downloaded { bytes: u64 },
}

/// Stateless downloader; cheap to clone and share across pool workers.
#[derive(Debug, Clone, Default)]
pub struct Fetcher {
    opts: CurlOptions,
}

impl Fetcher {
    pub fn new(opts: CurlOptions) -> Self {
        Self { opts }
    }

    /// Downloads `url` to `dest` with one attempt.
    ///
    /// The body is streamed into `<dest>.part` and renamed onto `dest` only
    /// after a 2xx response completed; on any error the temp file is removed
    /// and `dest` is left untouched.
    pub fn fetch(
        &self,
        url: &str,
        dest: &Path,
        headers: &HashMap<String, String>,
    ) -> Result<FetchOutcome, FetchError> {
        if storage::is_complete(dest) {
            tracing::debug!(path = %dest.display(), "already present, skipping");
            return Ok(FetchOutcome::Skipped);
        }

        let mut part = PartialFile::create(dest).map_err(|e| FetchError::storage(dest, e))?;
        let temp = part.temp_path().to_path_buf();
        transfer::get(url, headers, &self.opts, |data| {
            part.write_all(data).map_err(|e| FetchError::storage(&temp, e))
        })?;
        let bytes = part.commit(dest).map_err(|e| FetchError::storage(dest, e))?;
        Ok(FetchOutcome::Downloaded { bytes })
    }

    /// GETs `url` into memory (playlists).
    pub fn fetch_bytes(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();
        transfer::get(url, headers, &self.opts, |data| {
            body.extend_from_slice(data);
            Ok(())
        })?;
        Ok(body)
    }
}
