use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// HTTP transfer parameters (optional `[http]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Abort a transfer slower than this many bytes per second...
    pub low_speed_limit: u32,
    /// ...for this many seconds.
    pub low_speed_time_secs: u64,
    /// Hard ceiling on a single transfer, in seconds.
    pub timeout_secs: u64,
    /// Optional User-Agent for media requests.
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            low_speed_limit: 1024,
            low_speed_time_secs: 60,
            timeout_secs: 3600,
            user_agent: None,
        }
    }
}

/// Global configuration loaded from `~/.config/feedvault/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedvaultConfig {
    /// Profiles to archive, processed in order.
    pub profile_ids: Vec<String>,
    /// Profile page URL; the profile id is appended.
    pub profile_url_base: String,
    /// Root directory of the archive.
    pub storage_root: PathBuf,
    /// Substring identifying the feed endpoint among captured requests.
    pub api_fragment: String,
    /// Referer sent with media, playlist and segment requests.
    pub referer: String,
    /// Capture ends after this many seconds without newly observed data.
    pub idle_timeout_secs: u64,
    /// Sleep between capture polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Wait after navigating to a profile before scrolling, in seconds.
    pub initial_load_secs: u64,
    /// Concurrent image/video tasks per item.
    pub item_workers: usize,
    /// Concurrent segment fetches per video.
    pub segment_workers: usize,
    pub http: HttpConfig,
}

impl Default for FeedvaultConfig {
    fn default() -> Self {
        Self {
            profile_ids: Vec::new(),
            profile_url_base: "https://www.skland.com/profile?id=".to_string(),
            storage_root: PathBuf::from("archive"),
            api_fragment: "/web/v1/user/items".to_string(),
            referer: "https://www.skland.com/".to_string(),
            idle_timeout_secs: 15,
            poll_interval_ms: 1000,
            initial_load_secs: 5,
            item_workers: 3,
            segment_workers: 8,
            http: HttpConfig::default(),
        }
    }
}

impl FeedvaultConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn initial_load(&self) -> Duration {
        Duration::from_secs(self.initial_load_secs)
    }

    pub fn profile_url(&self, profile_id: &str) -> String {
        format!("{}{}", self.profile_url_base, profile_id)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("feedvault")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FeedvaultConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FeedvaultConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<FeedvaultConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: FeedvaultConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
