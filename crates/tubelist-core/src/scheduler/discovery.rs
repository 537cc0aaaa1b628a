//! FIFO of newly observed feed items awaiting reconciliation.

use std::collections::{HashSet, VecDeque};

use crate::dom::NodeId;

/// Items are deduplicated by handle while queued; order of first observation is kept.
#[derive(Debug, Default)]
pub struct DiscoveryQueue {
    items: VecDeque<NodeId>,
    queued: HashSet<NodeId>,
}

impl DiscoveryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an item. Returns false if it is already waiting.
    pub fn push(&mut self, item: NodeId) -> bool {
        if !self.queued.insert(item) {
            return false;
        }
        self.items.push_back(item);
        true
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = NodeId>) -> usize {
        items.into_iter().filter(|&item| self.push(item)).count()
    }

    /// Take up to `max` items in FIFO order.
    pub fn next_batch(&mut self, max: usize) -> Vec<NodeId> {
        let n = max.max(1).min(self.items.len());
        let batch: Vec<NodeId> = self.items.drain(..n).collect();
        for item in &batch {
            self.queued.remove(item);
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.queued.clear();
    }
}
