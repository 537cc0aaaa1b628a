//! Per-navigation activation state.

use crate::feed::Reconciler;
use crate::scheduler::{DiscoveryQueue, FetchQueue};

use super::liveness::NavToken;

/// Everything scoped to one activation of the feed page. Dropped wholesale on
/// navigation; nothing in it survives into the next session.
#[derive(Debug)]
pub struct Session {
    pub token: NavToken,
    pub signature: String,
    pub discovery: DiscoveryQueue,
    pub fetches: FetchQueue,
    pub reconciler: Reconciler,
}

impl Session {
    pub fn new(token: NavToken, signature: String, show_descriptions: bool) -> Self {
        Self {
            token,
            signature,
            discovery: DiscoveryQueue::new(),
            fetches: FetchQueue::new(),
            reconciler: Reconciler::new(show_descriptions),
        }
    }

    /// Drop queued work without touching the page.
    pub fn clear_queues(&mut self) {
        self.discovery.clear();
        self.fetches.clear();
    }
}
