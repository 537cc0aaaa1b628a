//! `tubelist settings` – show or change the saved settings.

use anyhow::Result;
use tubelist_core::kv::KvStore;
use tubelist_core::settings::{Settings, ViewMode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub enabled: Option<bool>,
    pub show_descriptions: Option<bool>,
    pub view_mode: Option<ViewMode>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, settings: &mut Settings) {
        if let Some(v) = self.enabled {
            settings.enabled = v;
        }
        if let Some(v) = self.show_descriptions {
            settings.show_descriptions = v;
        }
        if let Some(v) = self.view_mode {
            settings.view_mode = v;
        }
    }
}

pub async fn run_settings(kv: &KvStore, update: SettingsUpdate) -> Result<()> {
    let mut settings = Settings::load(kv).await?;
    if !update.is_empty() {
        update.apply(&mut settings);
        settings.save(kv).await?;
        tracing::info!(?settings, "settings updated");
    }
    println!("enabled:           {}", settings.enabled);
    println!("show descriptions: {}", settings.show_descriptions);
    println!("view mode:         {}", settings.view_mode);
    Ok(())
}
