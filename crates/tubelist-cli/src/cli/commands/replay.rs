//! `tubelist replay <fixture.json>` – run the feed pipeline over a synthetic page.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tubelist_core::config::TubelistConfig;
use tubelist_core::describe::{CurlFetcher, DescriptionEngine, PageFetcher};
use tubelist_core::dom::FeedBuilder;
use tubelist_core::feed;
use tubelist_core::kv::KvStore;
use tubelist_core::lifecycle::Controller;
use tubelist_core::retry::FetchError;
use tubelist_core::settings::Settings;
use tubelist_core::store::DescriptionStore;

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub fixture: PathBuf,
    pub url: Option<String>,
    pub offline: bool,
}

/// Serves watch pages built from the descriptions written in the fixture.
struct FixturePages {
    feed: FeedBuilder,
}

impl PageFetcher for FixturePages {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        let id = url.rsplit("v=").next().unwrap_or_default();
        let description = self.feed.description_for(id).ok_or(FetchError::Http(404))?;
        let json = serde_json::json!({ "videoDetails": { "shortDescription": description } });
        Ok(format!("<script>var ytInitialPlayerResponse = {json};</script>"))
    }
}

pub async fn run_replay(kv: &KvStore, cfg: &TubelistConfig, opts: &ReplayOptions) -> Result<()> {
    let json = tokio::fs::read_to_string(&opts.fixture)
        .await
        .with_context(|| format!("read fixture {}", opts.fixture.display()))?;
    let mut fixture = FeedBuilder::from_json(&json)
        .with_context(|| format!("parse fixture {}", opts.fixture.display()))?;
    if let Some(url) = &opts.url {
        fixture = fixture.url(url);
    }
    let doc = fixture.build();

    let (fetcher, store): (Arc<dyn PageFetcher>, DescriptionStore) = if opts.offline {
        (
            Arc::new(FixturePages {
                feed: fixture.clone(),
            }),
            DescriptionStore::memory(cfg.store.clone()),
        )
    } else {
        (
            Arc::new(CurlFetcher::new(&cfg.fetch)),
            DescriptionStore::new(Some(kv.clone()), cfg.store.clone()),
        )
    };
    let engine = DescriptionEngine::new(fetcher, store, &cfg.fetch, &cfg.summary);
    let settings = Settings::load(kv).await?;

    let mut controller = Controller::new(doc, engine, settings, cfg.scheduler.clone());
    controller.run_until_idle().await;

    let views = feed::item_views(controller.document());
    println!("{}", serde_json::to_string_pretty(&views)?);

    controller.engine().store().flush().await?;
    Ok(())
}
