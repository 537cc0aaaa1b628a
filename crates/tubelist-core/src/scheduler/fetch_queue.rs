//! FIFO of video ids awaiting descriptions.

use std::collections::{HashSet, VecDeque};

/// Pending ids plus the set currently being fetched. An id is never queued
/// twice and never queued while its fetch is in flight.
#[derive(Debug, Default)]
pub struct FetchQueue {
    pending: VecDeque<String>,
    queued: HashSet<String>,
    in_flight: HashSet<String>,
}

impl FetchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `id` unless it is already queued or in flight.
    pub fn enqueue(&mut self, id: &str) -> bool {
        if self.in_flight.contains(id) || self.queued.contains(id) {
            return false;
        }
        self.queued.insert(id.to_string());
        self.pending.push_back(id.to_string());
        true
    }

    /// Pop the next id if fewer than `max_in_flight` fetches are running.
    /// The id moves to the in-flight set until [`FetchQueue::complete`].
    pub fn start_next(&mut self, max_in_flight: usize) -> Option<String> {
        if self.in_flight.len() >= max_in_flight.max(1) {
            return None;
        }
        let id = self.pending.pop_front()?;
        self.queued.remove(&id);
        self.in_flight.insert(id.clone());
        Some(id)
    }

    /// Mark a fetch finished. Returns false if `id` was not in flight.
    pub fn complete(&mut self, id: &str) -> bool {
        self.in_flight.remove(id)
    }

    pub fn is_tracked(&self, id: &str) -> bool {
        self.queued.contains(id) || self.in_flight.contains(id)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.queued.clear();
        self.in_flight.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupes_queued_and_in_flight() {
        let mut q = FetchQueue::new();
        assert!(q.enqueue("a"));
        assert!(!q.enqueue("a"));
        assert_eq!(q.start_next(1).as_deref(), Some("a"));
        assert!(!q.enqueue("a"), "in flight");
        assert!(q.complete("a"));
        assert!(q.enqueue("a"), "finished ids may be queued again");
    }

    #[test]
    fn respects_in_flight_cap_and_fifo() {
        let mut q = FetchQueue::new();
        for id in ["a", "b", "c"] {
            q.enqueue(id);
        }
        assert_eq!(q.start_next(2).as_deref(), Some("a"));
        assert_eq!(q.start_next(2).as_deref(), Some("b"));
        assert_eq!(q.start_next(2), None);
        q.complete("a");
        assert_eq!(q.start_next(2).as_deref(), Some("c"));
        assert_eq!(q.pending_len(), 0);
        assert_eq!(q.in_flight_len(), 2);
        assert!(!q.is_idle());
    }
}
