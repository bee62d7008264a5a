//! `feedvault assemble <playlist-url> <dest>` – one HLS assembly.

use anyhow::Result;
use feedvault_core::config::FeedvaultConfig;
use feedvault_core::fetch::{CurlOptions, Fetcher};
use feedvault_core::hls::{AssembleOutcome, Assembler};
use feedvault_core::pool::Pools;
use std::path::Path;

use super::{ensure_parent, referer_headers};

pub fn run_assemble(
    cfg: &FeedvaultConfig,
    playlist_url: &str,
    dest: &Path,
    referer: Option<String>,
) -> Result<()> {
    ensure_parent(dest)?;
    let headers = referer_headers(referer.as_deref().unwrap_or(&cfg.referer));
    let fetcher = Fetcher::new(CurlOptions::from(&cfg.http));
    let assembler = Assembler::new(fetcher, Pools::from_config(cfg).segment);
    let label = dest
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());

    match assembler.assemble(playlist_url, dest, &headers, &label)? {
        AssembleOutcome::Skipped => println!("already present: {}", dest.display()),
        AssembleOutcome::Assembled { segments, bytes } => println!(
            "assembled {} segments ({} bytes) into {}",
            segments,
            bytes,
            dest.display()
        ),
    }
    Ok(())
}
