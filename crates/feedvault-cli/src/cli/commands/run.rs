//! `feedvault run --har <path>...` – archive profiles from recorded traffic.

use anyhow::{bail, Result};
use feedvault_core::config::FeedvaultConfig;
use feedvault_core::pipeline::Archiver;
use feedvault_core::session::har::HarSession;
use std::path::PathBuf;

pub fn run_archive(
    mut cfg: FeedvaultConfig,
    har: &[PathBuf],
    profiles: Vec<String>,
    storage_root: Option<PathBuf>,
) -> Result<()> {
    if let Some(root) = storage_root {
        cfg.storage_root = root;
    }
    let profile_ids = if profiles.is_empty() {
        cfg.profile_ids.clone()
    } else {
        profiles
    };
    if profile_ids.is_empty() {
        bail!("no profiles to archive: pass --profile or set profile_ids in the config");
    }

    let mut session = HarSession::open_all(har)?;
    tracing::info!(
        files = har.len(),
        entries = session.entry_count(),
        profiles = profile_ids.len(),
        "replaying recorded session"
    );

    let archiver = Archiver::from_config(&cfg);
    let reports = archiver.run_profiles(&mut session, &profile_ids);

    for r in &reports {
        let dir = r
            .profile_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<16} {:>6} records  {:>6} ok  {:>6} failed  {}",
            r.profile_id, r.records, r.tasks_ok, r.tasks_failed, dir
        );
    }
    let failed_profiles = profile_ids.len() - reports.len();
    if failed_profiles > 0 {
        bail!("{} profile(s) failed; see the log for details", failed_profiles);
    }
    Ok(())
}
