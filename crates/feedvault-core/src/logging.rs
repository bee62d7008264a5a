//! Structured logging for the archiver.
//!
//! Events go to `$XDG_STATE_HOME/feedvault/feedvault.log`; the CLI falls back
//! to stderr when that file cannot be opened. `RUST_LOG` overrides the default
//! filter.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,feedvault=debug,feedvault_core=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Location of the log file; the directory is not created.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("feedvault")?;
    Ok(xdg_dirs.get_state_home().join("feedvault").join("feedvault.log"))
}

/// Appends to [`log_file_path`]. Returns Err if the file cannot be opened so
/// the caller can use [`init_logging_stderr`] instead.
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create log dir: {}", dir.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file: {}", path.display()))?;

    // Pool workers log concurrently; the mutex keeps lines whole.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_thread_names(true)
        .with_ansi(false)
        .init();

    tracing::info!(path = %path.display(), "feedvault logging initialized");
    Ok(())
}

/// Logs to stderr only.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
