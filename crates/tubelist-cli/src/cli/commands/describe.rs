//! `tubelist describe <ID>...` – look up descriptions through the engine.

use std::sync::Arc;

use anyhow::{Context, Result};
use tubelist_core::config::TubelistConfig;
use tubelist_core::describe::{CurlFetcher, DescriptionEngine};
use tubelist_core::feed::VideoId;
use tubelist_core::kv::KvStore;
use tubelist_core::store::DescriptionStore;

pub async fn run_describe(kv: &KvStore, cfg: &TubelistConfig, ids: &[String]) -> Result<()> {
    let ids: Vec<VideoId> = ids
        .iter()
        .map(|raw| VideoId::parse(raw).with_context(|| format!("invalid video id {raw:?}")))
        .collect::<Result<_>>()?;

    let store = DescriptionStore::new(Some(kv.clone()), cfg.store.clone());
    let engine = DescriptionEngine::new(
        Arc::new(CurlFetcher::new(&cfg.fetch)),
        store,
        &cfg.fetch,
        &cfg.summary,
    );
    engine.begin_navigation();

    let tasks: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let engine = engine.clone();
            tokio::spawn(async move {
                let text = engine.fetch_description(id.as_str()).await;
                (id, text)
            })
        })
        .collect();
    for task in tasks {
        let (id, text) = task.await.context("describe task join")?;
        if text.is_empty() {
            println!("{id}\t-");
        } else {
            println!("{id}\t{text}");
        }
    }

    engine.store().flush().await?;
    Ok(())
}
