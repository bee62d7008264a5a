//! Runs an item's download tasks on the item pool and reports each outcome.

use std::path::Path;

use super::plan::{plan_item, DownloadTask, TaskKind};
use crate::error::ErrorKind;
use crate::fetch::{FetchOutcome, Fetcher};
use crate::hls::{AssembleOutcome, Assembler};
use crate::model::Item;
use crate::pool::WorkerPool;

/// How one task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Destination was already complete.
    Skipped,
    Done { bytes: u64 },
    Failed { kind: ErrorKind, message: String },
}

#[derive(Debug, Clone)]
pub struct TaskReport {
    pub label: String,
    pub kind: TaskKind,
    pub status: TaskStatus,
}

impl TaskReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, TaskStatus::Failed { .. })
    }
}

/// Runs all media tasks of an item on the item-scope pool.
#[derive(Debug, Clone)]
pub struct MediaScheduler {
    fetcher: Fetcher,
    assembler: Assembler,
    pool: WorkerPool,
    referer: String,
}

impl MediaScheduler {
    pub fn new(fetcher: Fetcher, assembler: Assembler, pool: WorkerPool, referer: impl Into<String>) -> Self {
        Self {
            fetcher,
            assembler,
            pool,
            referer: referer.into(),
        }
    }

    /// Downloads the item's media into `item_dir`. A failed task is logged
    /// and reported; its siblings still run.
    pub fn process(&self, item: &Item, item_dir: &Path) -> Vec<TaskReport> {
        let tasks = plan_item(item, item_dir, &self.referer);
        tracing::info!(item_id = %item.id, title = %item.title, tasks = tasks.len(), "processing item");
        let reports = self.pool.run(tasks, |task| self.run_task(task));
        let failed = reports.iter().filter(|r| r.is_failed()).count();
        if failed > 0 {
            tracing::warn!(item_id = %item.id, failed, total = reports.len(), "item finished with failures");
        }
        reports
    }

    fn run_task(&self, task: DownloadTask) -> TaskReport {
        let status = match task.kind {
            TaskKind::Image => match self.fetcher.fetch(&task.url, &task.dest, &task.headers) {
                Ok(FetchOutcome::Skipped) => TaskStatus::Skipped,
                Ok(FetchOutcome::Downloaded { bytes }) => TaskStatus::Done { bytes },
                Err(e) => TaskStatus::Failed {
                    kind: e.kind(),
                    message: e.to_string(),
                },
            },
            TaskKind::Video => {
                match self
                    .assembler
                    .assemble(&task.url, &task.dest, &task.headers, &task.label)
                {
                    Ok(AssembleOutcome::Skipped) => TaskStatus::Skipped,
                    Ok(AssembleOutcome::Assembled { bytes, .. }) => TaskStatus::Done { bytes },
                    Err(e) => TaskStatus::Failed {
                        kind: e.kind(),
                        message: e.to_string(),
                    },
                }
            }
        };
        match &status {
            TaskStatus::Failed { kind, message } => {
                tracing::error!(label = %task.label, url = %task.url, ?kind, "download failed: {}", message);
            }
            TaskStatus::Done { bytes } => {
                tracing::debug!(label = %task.label, path = %task.dest.display(), bytes, "downloaded");
            }
            TaskStatus::Skipped => {}
        }
        TaskReport {
            label: task.label,
            kind: task.kind,
            status,
        }
    }
}
