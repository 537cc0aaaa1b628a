//! CLI for tubelist: drives the description engine, the store and the feed
//! pipeline outside a browser.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tubelist_core::config;
use tubelist_core::kv::KvStore;
use tubelist_core::settings::ViewMode;

use commands::{run_describe, run_replay, run_settings, run_store, ReplayOptions, SettingsUpdate};

/// Top-level CLI for tubelist.
#[derive(Debug, Parser)]
#[command(name = "tubelist")]
#[command(about = "tubelist: list view for the subscriptions feed, with video descriptions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch (or read from the store) the short description of videos.
    Describe {
        /// Video ids, e.g. dQw4w9WgXcQ.
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Inspect or maintain the persistent description store.
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },

    /// Show settings, or change them when any flag is given.
    Settings {
        /// Master switch for the augmented layout.
        #[arg(long, value_name = "BOOL")]
        enabled: Option<bool>,
        /// Show description lines under each item.
        #[arg(long, value_name = "BOOL")]
        show_descriptions: Option<bool>,
        /// list or grid.
        #[arg(long, value_name = "MODE")]
        view_mode: Option<ViewMode>,
    },

    /// Build a feed page from a JSON fixture, augment it and print the result.
    Replay {
        /// Path to the fixture file.
        fixture: PathBuf,
        /// Page location to load the fixture at (defaults to the fixture's url).
        #[arg(long)]
        url: Option<String>,
        /// Serve descriptions from the fixture instead of the network.
        #[arg(long)]
        offline: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum StoreAction {
    /// Entry counts and age range.
    Stats,
    /// Drop expired entries.
    Prune,
    /// Remove every entry.
    Clear,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let kv = KvStore::open_default().await?;

        match cli.command {
            CliCommand::Describe { ids } => run_describe(&kv, &cfg, &ids).await?,
            CliCommand::Store { action } => run_store(&kv, &cfg, action).await?,
            CliCommand::Settings {
                enabled,
                show_descriptions,
                view_mode,
            } => {
                let update = SettingsUpdate {
                    enabled,
                    show_descriptions,
                    view_mode,
                };
                run_settings(&kv, update).await?;
            }
            CliCommand::Replay {
                fixture,
                url,
                offline,
            } => {
                let opts = ReplayOptions {
                    fixture,
                    url,
                    offline,
                };
                run_replay(&kv, &cfg, &opts).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
