//! `tubelist store stats|prune|clear` – maintain the description store.

use anyhow::Result;
use tubelist_core::config::TubelistConfig;
use tubelist_core::kv::KvStore;
use tubelist_core::store::{now_ms, DescriptionStore};

use crate::cli::StoreAction;

fn age(now: u64, at: Option<u64>) -> String {
    at.map(|t| format!("{}s ago", now.saturating_sub(t) / 1000))
        .unwrap_or_else(|| "-".to_string())
}

pub async fn run_store(kv: &KvStore, cfg: &TubelistConfig, action: StoreAction) -> Result<()> {
    let store = DescriptionStore::new(Some(kv.clone()), cfg.store.clone());
    store.ensure_loaded().await;

    match action {
        StoreAction::Stats => {
            let now = now_ms();
            let stats = store.stats_at(now);
            println!("entries:  {}", stats.entries);
            println!("expired:  {}", stats.expired);
            println!("empty:    {}", stats.empty);
            println!("oldest:   {}", age(now, stats.oldest_ms));
            println!("newest:   {}", age(now, stats.newest_ms));
            println!(
                "limits:   {} entries, ttl {} min",
                cfg.store.max_entries, cfg.store.ttl_minutes
            );
        }
        StoreAction::Prune => {
            let removed = store.prune();
            println!("Pruned {removed} expired entries.");
        }
        StoreAction::Clear => {
            let removed = store.clear();
            println!("Removed {removed} entries.");
        }
    }

    store.flush().await?;
    Ok(())
}
