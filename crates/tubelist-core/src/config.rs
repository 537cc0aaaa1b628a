use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Retry policy parameters for watch-page retrieval (optional `[fetch.retry]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per page (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 1.0 = 1s).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay_secs: 1.0,
            max_delay_secs: 5,
        }
    }
}

/// Persistent description store limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Entries older than this are never returned.
    pub ttl_minutes: u64,
    /// Upper bound on stored entries; oldest-by-timestamp are evicted first.
    pub max_entries: usize,
    /// Writes within this window are coalesced into one bulk write.
    pub write_debounce_ms: u64,
    /// Interval of the opportunistic expiry sweep.
    pub prune_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 60,
            max_entries: 1200,
            write_debounce_ms: 1500,
            prune_interval_secs: 600,
        }
    }
}

impl StoreConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_minutes.saturating_mul(60))
    }

    pub fn write_debounce(&self) -> Duration {
        Duration::from_millis(self.write_debounce_ms)
    }

    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs.max(1))
    }
}

/// Watch-page retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum watch-page requests in flight at once.
    pub max_concurrent: usize,
    /// Maximum network retrievals per navigation; further lookups resolve empty.
    pub navigation_budget: usize,
    /// Canonical watch URL prefix; the video id is appended.
    pub watch_url_base: String,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Optional retry policy; if missing, built-in defaults are used.
    pub retry: Option<RetryConfig>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 1,
            navigation_budget: 250,
            watch_url_base: "https://www.youtube.com/watch?v=".to_string(),
            connect_timeout_secs: 10,
            timeout_secs: 20,
            user_agent: concat!("tubelist/", env!("CARGO_PKG_VERSION")).to_string(),
            retry: None,
        }
    }
}

impl FetchConfig {
    pub fn watch_url(&self, video_id: &str) -> String {
        format!("{}{}", self.watch_url_base, video_id)
    }
}

/// Sentence segmentation backend for summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segmenter {
    /// UAX #29 sentence boundaries.
    #[default]
    Unicode,
    /// Punctuation regex that keeps URLs intact.
    Heuristic,
}

/// Description summarization limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub sentence_count: usize,
    pub max_chars: usize,
    pub segmenter: Segmenter,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            sentence_count: 2,
            max_chars: 260,
            segmenter: Segmenter::Unicode,
        }
    }
}

/// Discovery batching and periodic tick intervals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Feed items reconciled per idle turn.
    pub discovery_batch_size: usize,
    /// Self-healing rescan of loading placeholders.
    pub rescan_interval_ms: u64,
    /// Location polling for back/forward navigation.
    pub url_poll_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            discovery_batch_size: 8,
            rescan_interval_ms: 2000,
            url_poll_interval_ms: 500,
        }
    }
}

impl SchedulerConfig {
    pub fn rescan_interval(&self) -> Duration {
        Duration::from_millis(self.rescan_interval_ms.max(1))
    }

    pub fn url_poll_interval(&self) -> Duration {
        Duration::from_millis(self.url_poll_interval_ms.max(1))
    }
}

/// Global configuration loaded from `~/.config/tubelist/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TubelistConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tubelist")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TubelistConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] with an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<TubelistConfig> {
    if !path.exists() {
        let default_cfg = TubelistConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: TubelistConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
