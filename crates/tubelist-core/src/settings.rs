//! User settings: master switch, description visibility and view mode.
//!
//! Stored as one JSON record in the kv table. The two booleans are read once
//! per activation; the view mode is switched at runtime and saved right away.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::kv::KvStore;

pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Augmented list layout.
    #[default]
    List,
    /// Host default grid; nothing is augmented.
    Grid,
}

impl std::str::FromStr for ViewMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "list" => Ok(ViewMode::List),
            "grid" => Ok(ViewMode::Grid),
            other => anyhow::bail!("unknown view mode {other:?} (expected list or grid)"),
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ViewMode::List => "list",
            ViewMode::Grid => "grid",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub enabled: bool,
    pub show_descriptions: bool,
    pub view_mode: ViewMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            show_descriptions: true,
            view_mode: ViewMode::List,
        }
    }
}

impl Settings {
    /// Saved settings, or defaults when none are stored. A corrupted record
    /// also yields defaults.
    pub async fn load(kv: &KvStore) -> Result<Self> {
        let Some(json) = kv.get(SETTINGS_KEY).await? else {
            return Ok(Self::default());
        };
        match serde_json::from_str(&json) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!(error = %e, "unreadable settings record, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub async fn save(&self, kv: &KvStore) -> Result<()> {
        let json = serde_json::to_string(self).context("serialize settings")?;
        kv.set(SETTINGS_KEY, &json).await
    }

    /// True when the augmented layout should run at all.
    pub fn augments(&self) -> bool {
        self.enabled && self.view_mode == ViewMode::List
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_when_missing_or_corrupt() {
        let kv = KvStore::open_memory().await.unwrap();
        assert_eq!(Settings::load(&kv).await.unwrap(), Settings::default());
        kv.set(SETTINGS_KEY, "{not json").await.unwrap();
        assert_eq!(Settings::load(&kv).await.unwrap(), Settings::default());
    }

    #[tokio::test]
    async fn save_and_load_round_trip_with_partial_record() {
        let kv = KvStore::open_memory().await.unwrap();
        let s = Settings {
            enabled: false,
            show_descriptions: true,
            view_mode: ViewMode::Grid,
        };
        s.save(&kv).await.unwrap();
        assert_eq!(Settings::load(&kv).await.unwrap(), s);

        kv.set(SETTINGS_KEY, r#"{"showDescriptions":false}"#).await.unwrap();
        let partial = Settings::load(&kv).await.unwrap();
        assert!(partial.enabled);
        assert!(!partial.show_descriptions);
        assert_eq!(partial.view_mode, ViewMode::List);
    }

    #[test]
    fn view_mode_parse_and_display() {
        assert_eq!("Grid".parse::<ViewMode>().unwrap(), ViewMode::Grid);
        assert_eq!(ViewMode::List.to_string(), "list");
        assert!("tiles".parse::<ViewMode>().is_err());
        assert!(!Settings { view_mode: ViewMode::Grid, ..Settings::default() }.augments());
    }
}
