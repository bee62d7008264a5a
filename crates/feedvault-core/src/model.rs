//! Feed records as returned by the profile items endpoint.
//!
//! Known fields are typed; everything else is kept in `extra` so the
//! persisted archive is a faithful copy of what was captured.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Display style whose URL is the full-resolution image.
pub const ORIGIN_STYLE: &str = "origin";

/// One element of a feed page list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedRecord {
    pub item: Item,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ProfileInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Owner of the captured feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInfo {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Empty when the record carries no usable id.
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Publish time in seconds; the archive sort key.
    #[serde(rename = "publishedAtTs", default)]
    pub published_at_ts: i64,
    /// Display time in seconds, used for the item directory name when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(rename = "imageListSlice", default, deserialize_with = "null_as_default")]
    pub images: Vec<ImageEntry>,
    #[serde(rename = "videoListSlice", default, deserialize_with = "null_as_default")]
    pub videos: Vec<VideoEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Seconds used to name the item directory.
    pub fn display_timestamp(&self) -> i64 {
        self.timestamp.unwrap_or(self.published_at_ts)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEntry {
    #[serde(rename = "displayInfos", default, deserialize_with = "null_as_default")]
    pub display_infos: Vec<DisplayInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageEntry {
    /// URL of the `origin` display variant, if any.
    pub fn origin_url(&self) -> Option<&str> {
        self.display_infos
            .iter()
            .find(|d| d.style.as_deref() == Some(ORIGIN_STYLE))
            .and_then(|d| d.url.as_deref())
            .filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayInfo {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub resolutions: Vec<VideoVariant>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VideoEntry {
    /// Greatest height wins; ties go to the greater width. The first of fully
    /// equal variants is kept.
    pub fn best_variant(&self) -> Option<&VideoVariant> {
        self.resolutions.iter().fold(None, |best, v| match best {
            Some(b) if (b.height, b.width) >= (v.height, v.width) => Some(b),
            _ => Some(v),
        })
    }
}

/// One quality rendition of a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoVariant {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub width: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub height: u32,
    #[serde(rename = "playURL", default)]
    pub play_url: Option<String>,
    /// Human-readable tag such as `1080p`.
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn string_or_number<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(de)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Like [`string_or_number`], but anything else (null, object) becomes empty.
fn lenient_id<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(de)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Ok(String::new()),
    }
}

/// `null` reads as the default value.
fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// Accepts `1080`, `"1080"` or `null` (as 0).
fn lenient_u32<'de, D>(de: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(de)? {
        Value::Number(n) => Ok(n.as_u64().map(|v| v.min(u32::MAX as u64) as u32).unwrap_or(0)),
        Value::String(s) => Ok(s.trim().parse().unwrap_or(0)),
        _ => Ok(0),
    }
}
