//! Profile driver: capture, persist and download, one profile at a time.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::archive;
use crate::capture::{self, CaptureOptions};
use crate::config::FeedvaultConfig;
use crate::fetch::{CurlOptions, Fetcher};
use crate::hls::Assembler;
use crate::media::MediaScheduler;
use crate::pool::Pools;
use crate::session::Session;

/// Totals for one archived profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileReport {
    pub profile_id: String,
    /// `None` when nothing was captured.
    pub profile_dir: Option<PathBuf>,
    pub records: usize,
    pub tasks_ok: usize,
    pub tasks_failed: usize,
}

/// Everything needed to archive profiles; built once from config.
#[derive(Debug, Clone)]
pub struct Archiver {
    config: FeedvaultConfig,
    capture: CaptureOptions,
    scheduler: MediaScheduler,
}

impl Archiver {
    pub fn from_config(cfg: &FeedvaultConfig) -> Self {
        let fetcher = Fetcher::new(CurlOptions::from(&cfg.http));
        let pools = Pools::from_config(cfg);
        let assembler = Assembler::new(fetcher.clone(), pools.segment);
        Self {
            config: cfg.clone(),
            capture: CaptureOptions::from_config(cfg),
            scheduler: MediaScheduler::new(fetcher, assembler, pools.item, cfg.referer.clone()),
        }
    }

    /// Archives one profile through `session`.
    ///
    /// Session failures and failure to write the profile archive are errors;
    /// per-item and per-download failures are logged and counted.
    pub fn run_profile<S: Session + ?Sized>(
        &self,
        session: &mut S,
        profile_id: &str,
    ) -> Result<ProfileReport> {
        let url = self.config.profile_url(profile_id);
        tracing::info!(profile_id, url = %url, "opening profile");
        session.navigate(&url)?;
        let initial_load = self.config.initial_load();
        if !initial_load.is_zero() {
            std::thread::sleep(initial_load);
        }

        let outcome = capture::capture(session, &self.capture)?;
        let mut report = ProfileReport {
            profile_id: profile_id.to_string(),
            ..ProfileReport::default()
        };
        if outcome.records.is_empty() {
            tracing::warn!(profile_id, "no items captured");
            return Ok(report);
        }

        let mut records = outcome.records;
        archive::sort_newest_first(&mut records);
        let profile = records[0].user.clone().or(outcome.profile);
        let (nickname, dir_id) = match &profile {
            Some(p) => (p.nickname.as_str(), p.id.as_str()),
            None => ("", profile_id),
        };
        let profile_dir = archive::ensure_profile_dir(&self.config.storage_root, nickname, dir_id)?;
        archive::write_profile_archive(&profile_dir, profile_id, &records)
            .with_context(|| format!("profile {}", profile_id))?;

        for record in &records {
            let item_dir = match archive::write_item_record(&profile_dir, record) {
                Ok(dir) => dir,
                Err(e) => {
                    tracing::error!(item_id = %record.item.id, "could not write item record: {:#}", e);
                    continue;
                }
            };
            for task in self.scheduler.process(&record.item, &item_dir) {
                if task.is_failed() {
                    report.tasks_failed += 1;
                } else {
                    report.tasks_ok += 1;
                }
            }
        }

        report.records = records.len();
        report.profile_dir = Some(profile_dir);
        tracing::info!(
            profile_id,
            records = report.records,
            ok = report.tasks_ok,
            failed = report.tasks_failed,
            "profile archived"
        );
        Ok(report)
    }

    /// Archives `profile_ids` in order. A failed profile is logged and left
    /// out of the result; the next one still runs.
    pub fn run_profiles<S: Session + ?Sized>(
        &self,
        session: &mut S,
        profile_ids: &[String],
    ) -> Vec<ProfileReport> {
        let mut reports = Vec::with_capacity(profile_ids.len());
        for id in profile_ids {
            match self.run_profile(session, id) {
                Ok(r) => reports.push(r),
                Err(e) => tracing::error!(profile_id = %id, "profile failed: {:#}", e),
            }
        }
        reports
    }
}
