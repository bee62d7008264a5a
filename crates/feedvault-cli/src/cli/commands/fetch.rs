//! `feedvault fetch <url> <dest>` – one download.

use anyhow::Result;
use feedvault_core::config::FeedvaultConfig;
use feedvault_core::fetch::{CurlOptions, FetchOutcome, Fetcher};
use std::path::Path;

use super::{ensure_parent, referer_headers};

pub fn run_fetch(
    cfg: &FeedvaultConfig,
    url: &str,
    dest: &Path,
    referer: Option<String>,
) -> Result<()> {
    ensure_parent(dest)?;
    let headers = referer_headers(referer.as_deref().unwrap_or(&cfg.referer));
    let fetcher = Fetcher::new(CurlOptions::from(&cfg.http));
    match fetcher.fetch(url, dest, &headers)? {
        FetchOutcome::Skipped => println!("already present: {}", dest.display()),
        FetchOutcome::Downloaded { bytes } => {
            println!("downloaded {} bytes to {}", bytes, dest.display())
        }
    }
    Ok(())
}
