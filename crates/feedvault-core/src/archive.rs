//! Final ordering and persistence of a captured feed.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::FeedRecord;
use crate::naming;

/// Sorts newest first by publish time. The sort is stable: records with equal
/// timestamps keep their arrival order, which matters because the upstream
/// feed does not paginate monotonically.
pub fn sort_newest_first(records: &mut [FeedRecord]) {
    records.sort_by(|a, b| b.item.published_at_ts.cmp(&a.item.published_at_ts));
}

/// `<root>/<nickname>_<profile id>`, created if missing.
pub fn ensure_profile_dir(root: &Path, nickname: &str, profile_id: &str) -> Result<PathBuf> {
    let dir = root.join(naming::profile_dir_name(nickname, profile_id));
    fs::create_dir_all(&dir)
        .with_context(|| format!("create profile directory: {}", dir.display()))?;
    Ok(dir)
}

/// Writes the whole sorted feed as `feed_<profile id>.json` in `profile_dir`.
pub fn write_profile_archive(
    profile_dir: &Path,
    profile_id: &str,
    records: &[FeedRecord],
) -> Result<PathBuf> {
    let path = profile_dir.join(format!("feed_{}.json", naming::sanitize_filename(profile_id)));
    write_json(&path, records)?;
    tracing::info!(path = %path.display(), records = records.len(), "wrote profile archive");
    Ok(path)
}

/// Creates the item directory and writes the record next to its media.
/// Returns the item directory.
pub fn write_item_record(profile_dir: &Path, record: &FeedRecord) -> Result<PathBuf> {
    let item = &record.item;
    let dir = profile_dir.join(naming::item_dir_name(
        item.display_timestamp(),
        &item.title,
        &item.id,
    ));
    fs::create_dir_all(&dir)
        .with_context(|| format!("create item directory: {}", dir.display()))?;
    write_json(&dir.join(naming::item_record_name(&item.title, &item.id)), record)?;
    Ok(dir)
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
