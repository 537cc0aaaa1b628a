//! Per-navigation volatile description cache and in-flight request map.
//!
//! The volatile cache is cleared on every navigation. The in-flight map
//! guarantees at most one retrieval per video id: the first caller becomes the
//! leader and publishes its result on a `watch` channel that later callers
//! await. A leader outlives the navigation that started it, so its entry stays
//! joinable until it publishes or gives up.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::store::{now_ms, DescriptionEntry};

/// Outcome of claiming a video id for retrieval.
pub enum Claim<'a> {
    /// Caller must fetch, then [`Leadership::publish`] the result.
    Leader(Leadership<'a>),
    /// Another caller is fetching; await its result.
    Follower(watch::Receiver<Option<String>>),
}

#[derive(Debug, Default)]
pub struct VolatileCache {
    entries: Mutex<HashMap<String, DescriptionEntry>>,
}

impl VolatileCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, DescriptionEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, id: &str) -> Option<String> {
        self.lock().get(id).map(|e| e.text.clone())
    }

    pub fn insert(&self, id: &str, text: &str) {
        self.lock()
            .insert(id.to_string(), DescriptionEntry::new(text, now_ms()));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

type Pending = HashMap<String, watch::Sender<Option<String>>>;

#[derive(Default)]
pub struct InFlight {
    pending: Mutex<Pending>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Become the leader for `id`, or subscribe to the current leader.
    pub fn claim(&self, id: &str) -> Claim<'_> {
        let mut pending = self.lock();
        if let Some(tx) = pending.get(id) {
            return Claim::Follower(tx.subscribe());
        }
        let (tx, _rx) = watch::channel(None);
        pending.insert(id.to_string(), tx);
        Claim::Leader(Leadership {
            in_flight: self,
            id: id.to_string(),
            published: false,
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    fn release(&self, id: &str) -> Option<watch::Sender<Option<String>>> {
        self.lock().remove(id)
    }
}

/// Held by the single caller fetching an id. Dropping it without publishing
/// releases the id and wakes followers with no result.
pub struct Leadership<'a> {
    in_flight: &'a InFlight,
    id: String,
    published: bool,
}

impl Leadership<'_> {
    pub fn publish(mut self, text: &str) {
        self.published = true;
        if let Some(tx) = self.in_flight.release(&self.id) {
            tx.send_replace(Some(text.to_string()));
        }
    }
}

impl Drop for Leadership<'_> {
    fn drop(&mut self) {
        if !self.published {
            self.in_flight.release(&self.id);
        }
    }
}

/// Await a leader's published result. `None` if the leader gave up.
pub async fn follow(mut rx: watch::Receiver<Option<String>>) -> Option<String> {
    match rx.wait_for(|v| v.is_some()).await {
        Ok(v) => v.clone(),
        Err(_) => None,
    }
}
