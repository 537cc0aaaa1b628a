//! Description engine: cached, deduplicated, bounded watch-page lookups.
//!
//! Lookup order for a video id:
//! 1. volatile cache (this navigation)
//! 2. persistent store
//! 3. an identical request already in flight (await it)
//! 4. navigation budget (exhausted: empty, remembered for this navigation only)
//! 5. a fetch slot, then GET + extract + summarize
//!
//! Every result, including empty ones, is written to both tiers so known-empty
//! descriptions are not fetched again. Nothing here returns an error.

mod extract;
mod fetcher;
mod summarize;

use std::sync::Arc;

use crate::cache::{follow, Claim, InFlight, VolatileCache};
use crate::config::{FetchConfig, SummaryConfig};
use crate::lifecycle::NavToken;
use crate::scheduler::{FetchSlots, NavigationBudget};
use crate::store::DescriptionStore;

pub use extract::{decode_entities, extract_description};
pub use fetcher::{CurlFetcher, PageFetcher};
pub use summarize::Summarizer;

struct Inner {
    fetcher: Arc<dyn PageFetcher>,
    store: DescriptionStore,
    cache: VolatileCache,
    in_flight: InFlight,
    slots: FetchSlots,
    budget: NavigationBudget,
    summarizer: Summarizer,
    fetch_cfg: FetchConfig,
}

/// Shared handle; clones refer to the same caches and limits.
#[derive(Clone)]
pub struct DescriptionEngine {
    inner: Arc<Inner>,
}

impl DescriptionEngine {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        store: DescriptionStore,
        fetch_cfg: &FetchConfig,
        summary_cfg: &SummaryConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                store,
                cache: VolatileCache::new(),
                in_flight: InFlight::new(),
                slots: FetchSlots::new(fetch_cfg.max_concurrent),
                budget: NavigationBudget::new(fetch_cfg.navigation_budget),
                summarizer: Summarizer::new(summary_cfg),
                fetch_cfg: fetch_cfg.clone(),
            }),
        }
    }

    pub fn store(&self) -> &DescriptionStore {
        &self.inner.store
    }

    pub fn slots(&self) -> &FetchSlots {
        &self.inner.slots
    }

    pub fn budget(&self) -> &NavigationBudget {
        &self.inner.budget
    }

    pub fn max_concurrent(&self) -> usize {
        self.inner.slots.max()
    }

    /// Known description without any network access. A store hit is copied
    /// into the volatile tier.
    pub fn cached(&self, id: &str) -> Option<String> {
        if let Some(text) = self.inner.cache.get(id) {
            return Some(text);
        }
        let text = self.inner.store.get(id)?;
        self.inner.cache.insert(id, &text);
        Some(text)
    }

    pub fn is_in_flight(&self, id: &str) -> bool {
        self.inner.in_flight.contains(id)
    }

    /// Forget everything scoped to the previous navigation. The store is kept,
    /// and fetches still running stay joinable through the in-flight map.
    pub fn begin_navigation(&self) {
        self.inner.cache.clear();
        self.inner.budget.reset();
    }

    /// Description for `id`; empty on any failure.
    pub async fn fetch_description(&self, id: &str) -> String {
        self.resolve(id, None).await
    }

    /// Like [`fetch_description`](Self::fetch_description), but stops waiting
    /// for a fetch slot once `token` goes stale. An abandoned lookup returns
    /// empty and caches nothing.
    pub async fn fetch_description_while(&self, id: &str, token: &NavToken) -> String {
        self.resolve(id, Some(token)).await
    }

    async fn resolve(&self, id: &str, token: Option<&NavToken>) -> String {
        self.inner.store.ensure_loaded().await;
        let live = || token.map_or(true, NavToken::is_live);
        loop {
            if let Some(text) = self.cached(id) {
                return text;
            }
            match self.inner.in_flight.claim(id) {
                Claim::Leader(leader) => {
                    // Dropping the leadership unpublished lets followers retry.
                    let Some(text) = self.lead(id, &live).await else {
                        return String::new();
                    };
                    leader.publish(&text);
                    return text;
                }
                Claim::Follower(rx) => {
                    tracing::trace!(id, "joining in-flight description fetch");
                    if let Some(text) = follow(rx).await {
                        return text;
                    }
                    if !live() {
                        return String::new();
                    }
                }
            }
        }
    }

    /// Fetch as the single leader for `id`. `None` if abandoned.
    async fn lead<F>(&self, id: &str, live: F) -> Option<String>
    where
        F: Fn() -> bool,
    {
        let inner = &self.inner;
        // A leader that finished just before this claim already wrote both tiers.
        if let Some(text) = self.cached(id) {
            return Some(text);
        }
        if !inner.budget.try_take() {
            tracing::debug!(id, "navigation fetch budget exhausted");
            inner.cache.insert(id, "");
            return Some(String::new());
        }

        let Some(_slot) = inner.slots.acquire_while(live).await else {
            tracing::trace!(id, "navigation ended while waiting for a fetch slot");
            return None;
        };

        let url = inner.fetch_cfg.watch_url(id);
        let fetcher = Arc::clone(&inner.fetcher);
        let raw = match tokio::task::spawn_blocking(move || fetcher.get(&url)).await {
            Ok(Ok(html)) => extract_description(&html).unwrap_or_default(),
            Ok(Err(e)) => {
                tracing::debug!(id, error = %e, "watch page fetch failed");
                String::new()
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "watch page fetch task failed");
                String::new()
            }
        };
        let text = inner.summarizer.summarize(&raw);
        tracing::debug!(id, chars = text.chars().count(), "description resolved");
        inner.cache.insert(id, &text);
        inner.store.set(id, &text);
        Some(text)
    }
}
