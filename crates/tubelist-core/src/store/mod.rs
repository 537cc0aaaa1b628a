//! Persistent description store.
//!
//! A bounded id→description map with time-to-live expiry, mirrored into the
//! kv table under a single key:
//! - loaded once, lazily, on first activation
//! - expired entries are dropped on read and by periodic pruning
//! - when over capacity the oldest entries (by stored time) are evicted
//! - every change marks the store dirty and schedules one debounced bulk write
//!
//! Callers never wait on the backing store; `get`/`set` only touch memory.

mod entry;
mod persist;
mod snapshot;

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::StoreConfig;
use crate::kv::KvStore;

pub use entry::{now_ms, DescriptionEntry};
pub use snapshot::{PersistedEntry, PersistedStore};

/// Key of the single kv record holding the whole store.
pub const STORE_KEY: &str = "descriptionCache";

#[derive(Debug, Default)]
struct StoreState {
    entries: HashMap<String, DescriptionEntry>,
    dirty: bool,
}

struct Inner {
    cfg: StoreConfig,
    kv: Option<KvStore>,
    state: Mutex<StoreState>,
    loaded: tokio::sync::OnceCell<()>,
    flush_scheduled: AtomicBool,
}

/// Summary numbers for `tubelist store stats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub entries: usize,
    pub expired: usize,
    pub empty: usize,
    pub oldest_ms: Option<u64>,
    pub newest_ms: Option<u64>,
}

/// Shared handle to the persistent tier. Cheap to clone.
#[derive(Clone)]
pub struct DescriptionStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for DescriptionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptionStore")
            .field("entries", &self.len())
            .field("persistent", &self.inner.kv.is_some())
            .finish()
    }
}

impl DescriptionStore {
    /// Store backed by `kv`. Pass `None` for a memory-only store (persistence unavailable).
    pub fn new(kv: Option<KvStore>, cfg: StoreConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                kv,
                state: Mutex::new(StoreState::default()),
                loaded: tokio::sync::OnceCell::new(),
                flush_scheduled: AtomicBool::new(false),
            }),
        }
    }

    pub fn memory(cfg: StoreConfig) -> Self {
        Self::new(None, cfg)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.cfg
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ttl_ms(&self) -> u64 {
        self.inner.cfg.ttl().as_millis() as u64
    }

    /// Look up a live description.
    pub fn get(&self, id: &str) -> Option<String> {
        self.get_at(id, now_ms())
    }

    /// Look up a live description as of `now_ms`. An expired entry is removed.
    pub fn get_at(&self, id: &str, now_ms: u64) -> Option<String> {
        let ttl = self.ttl_ms();
        let mut state = self.lock();
        match state.entries.get(id) {
            None => return None,
            Some(e) if !e.is_expired(now_ms, ttl) => return Some(e.text.clone()),
            Some(_) => {}
        }
        state.entries.remove(id);
        state.dirty = true;
        drop(state);
        tracing::trace!(id, "expired store entry dropped on read");
        self.schedule_flush();
        None
    }

    /// Store a description (possibly empty) stamped with the current time.
    pub fn set(&self, id: &str, text: &str) {
        self.set_at(id, text, now_ms());
    }

    /// Store a description stamped with `now_ms`, evicting the oldest entries over capacity.
    pub fn set_at(&self, id: &str, text: &str, now_ms: u64) {
        let max = self.inner.cfg.max_entries.max(1);
        let mut state = self.lock();
        state
            .entries
            .insert(id.to_string(), DescriptionEntry::new(text, now_ms));
        let evicted = evict_oldest(&mut state.entries, max, Some(id));
        state.dirty = true;
        drop(state);
        if evicted > 0 {
            tracing::debug!(evicted, "store over capacity, evicted oldest entries");
        }
        self.schedule_flush();
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn prune(&self) -> usize {
        self.prune_at(now_ms())
    }

    pub fn prune_at(&self, now_ms: u64) -> usize {
        let ttl = self.ttl_ms();
        let mut state = self.lock();
        let before = state.entries.len();
        state.entries.retain(|_, e| !e.is_expired(now_ms, ttl));
        let removed = before - state.entries.len();
        if removed > 0 {
            state.dirty = true;
        }
        drop(state);
        if removed > 0 {
            tracing::debug!(removed, "pruned expired store entries");
            self.schedule_flush();
        }
        removed
    }

    /// Remove everything (persisted on the next flush).
    pub fn clear(&self) -> usize {
        let mut state = self.lock();
        let removed = state.entries.len();
        state.entries.clear();
        state.dirty = true;
        drop(state);
        self.schedule_flush();
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> StoreStats {
        self.stats_at(now_ms())
    }

    pub fn stats_at(&self, now_ms: u64) -> StoreStats {
        let ttl = self.ttl_ms();
        let state = self.lock();
        let entries = &state.entries;
        StoreStats {
            entries: entries.len(),
            expired: entries.values().filter(|e| e.is_expired(now_ms, ttl)).count(),
            empty: entries.values().filter(|e| e.text.is_empty()).count(),
            oldest_ms: entries.values().map(|e| e.stored_at_ms).min(),
            newest_ms: entries.values().map(|e| e.stored_at_ms).max(),
        }
    }
}

/// Remove oldest-by-timestamp entries until `entries.len() <= max`.
/// `keep` is never evicted (the entry just inserted).
fn evict_oldest(
    entries: &mut HashMap<String, DescriptionEntry>,
    max: usize,
    keep: Option<&str>,
) -> usize {
    if entries.len() <= max {
        return 0;
    }
    let excess = entries.len() - max;
    let mut by_age: Vec<(u64, String)> = entries
        .iter()
        .filter(|(id, _)| Some(id.as_str()) != keep)
        .map(|(id, e)| (e.stored_at_ms, id.clone()))
        .collect();
    by_age.sort();
    let mut evicted = 0;
    for (_, id) in by_age.into_iter().take(excess) {
        entries.remove(&id);
        evicted += 1;
    }
    evicted
}

#[cfg(test)]
mod tests;
