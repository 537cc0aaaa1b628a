//! Load from / flush to the kv table, with debounced write scheduling.

use std::sync::atomic::Ordering;

use anyhow::{Context, Result};

use super::snapshot::{self, PersistedStore};
use super::{evict_oldest, now_ms, DescriptionStore, STORE_KEY};

impl DescriptionStore {
    /// Load the persisted record once. Later calls return immediately.
    ///
    /// A missing, unreadable or corrupted record leaves the store empty; it is
    /// rebuilt from subsequent fetches.
    pub async fn ensure_loaded(&self) {
        self.inner
            .loaded
            .get_or_init(|| async {
                if let Err(e) = self.load().await {
                    tracing::warn!(error = %e, "description store unavailable, starting empty");
                }
            })
            .await;
    }

    async fn load(&self) -> Result<()> {
        let Some(kv) = &self.inner.kv else {
            return Ok(());
        };
        let Some(json) = kv.get(STORE_KEY).await? else {
            return Ok(());
        };
        let persisted: PersistedStore =
            serde_json::from_str(&json).context("parse persisted description store")?;

        let ttl = self.ttl_ms();
        let now = now_ms();
        let max = self.inner.cfg.max_entries.max(1);
        let mut state = self.lock();
        let mut loaded = 0usize;
        for (id, entry) in snapshot::from_snapshot(persisted) {
            if entry.is_expired(now, ttl) {
                state.dirty = true;
                continue;
            }
            // Entries written before the load finished are newer; keep them.
            state.entries.entry(id).or_insert_with(|| {
                loaded += 1;
                entry
            });
        }
        if evict_oldest(&mut state.entries, max, None) > 0 {
            state.dirty = true;
        }
        drop(state);
        tracing::debug!(loaded, "description store loaded");
        Ok(())
    }

    /// Write the whole mapping if anything changed since the last write.
    pub async fn flush(&self) -> Result<()> {
        let Some(kv) = &self.inner.kv else {
            return Ok(());
        };
        let json = {
            let mut state = self.lock();
            if !state.dirty {
                return Ok(());
            }
            state.dirty = false;
            serde_json::to_string(&snapshot::to_snapshot(&state.entries))
                .context("serialize description store")?
        };
        if let Err(e) = kv.set(STORE_KEY, &json).await {
            self.lock().dirty = true;
            return Err(e);
        }
        tracing::trace!(bytes = json.len(), "description store written");
        Ok(())
    }

    /// Arrange one flush after the debounce window. Writes requested while a
    /// flush is pending are coalesced into it. Without a runtime nothing is
    /// scheduled; callers flush explicitly.
    pub(super) fn schedule_flush(&self) {
        if self.inner.kv.is_none() {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        if self.inner.flush_scheduled.swap(true, Ordering::AcqRel) {
            return;
        }
        let store = self.clone();
        let delay = self.inner.cfg.write_debounce();
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            store.inner.flush_scheduled.store(false, Ordering::Release);
            if let Err(e) = store.flush().await {
                tracing::warn!(error = %e, "debounced description store write failed");
            }
        });
    }
}
