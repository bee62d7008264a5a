//! Per-item media downloads.

mod plan;
mod schedule;

pub use plan::{plan_item, DownloadTask, TaskKind};
pub use schedule::{MediaScheduler, TaskReport, TaskStatus};
