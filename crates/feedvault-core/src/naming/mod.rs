//! Local names for profile directories, item directories and media files.
//!
//! Every name that comes from captured data goes through
//! [`sanitize_filename`]; an empty result is replaced with a placeholder.

mod path;
mod sanitize;

pub use path::extension_from_url;
pub use sanitize::sanitize_filename;

use chrono::{Local, TimeZone};

/// Placeholder for titles that sanitize to nothing.
const UNTITLED: &str = "untitled";

/// Placeholder for item ids that are missing or sanitize to nothing.
const NO_ID: &str = "noid";

/// Extension used when an image URL carries none.
const DEFAULT_IMAGE_EXT: &str = ".jpg";

/// Sanitized title, or `untitled` when nothing usable remains.
pub fn title_stem(title: &str) -> String {
    let s = sanitize_filename(title);
    if s.is_empty() {
        UNTITLED.to_string()
    } else {
        s
    }
}

fn id_part(item_id: &str) -> String {
    let s = sanitize_filename(item_id);
    if s.is_empty() {
        NO_ID.to_string()
    } else {
        s
    }
}

/// `<nickname>_<id>`, falling back to the id alone.
pub fn profile_dir_name(nickname: &str, profile_id: &str) -> String {
    let nick = sanitize_filename(nickname);
    let id = sanitize_filename(profile_id);
    if nick.is_empty() {
        id
    } else {
        format!("{}_{}", nick, id)
    }
}

/// `<YYYY-mm-dd HH-MM-SS>_<title>_<id>` with the timestamp rendered in local time.
pub fn item_dir_name(timestamp_secs: i64, title: &str, item_id: &str) -> String {
    let when = Local
        .timestamp_opt(timestamp_secs, 0)
        .single()
        .map(|t| t.format("%Y-%m-%d %H-%M-%S").to_string())
        .unwrap_or_else(|| timestamp_secs.to_string());
    format!("{}_{}_{}", when, title_stem(title), id_part(item_id))
}

/// `<title>_<id>.json`, the per-item record file.
pub fn item_record_name(title: &str, item_id: &str) -> String {
    format!("{}_{}.json", title_stem(title), id_part(item_id))
}

/// `<title>_<n><ext>` for the `n`-th (1-based) image of an item.
pub fn image_file_name(title: &str, n: usize, url: &str) -> String {
    let ext = extension_from_url(url).unwrap_or_else(|| DEFAULT_IMAGE_EXT.to_string());
    format!("{}_{}{}", title_stem(title), n, ext)
}

/// `<title>_<n>_<tag>.mp4` for the `n`-th (1-based) video of an item.
pub fn video_file_name(title: &str, n: usize, resolution_tag: Option<&str>) -> String {
    let tag = resolution_tag
        .map(sanitize_filename)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "high".to_string());
    format!("{}_{}_{}.mp4", title_stem(title), n, tag)
}
