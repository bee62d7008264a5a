//! CLI command handlers, one file per command.

mod assemble;
mod config_path;
mod decode;
mod fetch;
mod run;

pub use assemble::run_assemble;
pub use config_path::run_config_path;
pub use decode::run_decode;
pub use fetch::run_fetch;
pub use run::run_archive;

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Request headers for a one-off download: just the Referer, when non-empty.
fn referer_headers(referer: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    if !referer.is_empty() {
        headers.insert("Referer".to_string(), referer.to_string());
    }
    headers
}

/// Creates the parent directory of `dest` if it has one.
fn ensure_parent(dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory: {}", parent.display()))?;
    }
    Ok(())
}
