//! In-flight fetch slots and the per-navigation retrieval budget.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

use super::guard::SlotGuard;

/// How often a waiter re-checks its liveness condition when no slot frees up.
const RECHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Counter of in-flight page retrievals compared against a fixed maximum.
/// Callers that find no free slot wait (yielding) and re-check instead of
/// being rejected.
#[derive(Debug)]
pub struct FetchSlots {
    max: usize,
    in_use: AtomicUsize,
    peak: AtomicUsize,
    released: Notify,
}

impl FetchSlots {
    /// Create slots with the given maximum (e.g. `fetch.max_concurrent`).
    pub fn new(max: usize) -> Self {
        Self {
            max: max.max(1),
            in_use: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            released: Notify::new(),
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Number of slots currently held.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Relaxed)
    }

    /// Free slots (max - in_use).
    pub fn available(&self) -> usize {
        self.max.saturating_sub(self.in_use())
    }

    /// Highest simultaneous occupancy observed.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }

    /// Take a slot if one is free.
    pub fn try_acquire(&self) -> Option<SlotGuard<'_>> {
        let mut current = self.in_use.load(Ordering::Relaxed);
        loop {
            if current >= self.max {
                return None;
            }
            match self.in_use.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    self.peak.fetch_max(current + 1, Ordering::Relaxed);
                    return Some(SlotGuard::new(self));
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Wait for a slot while `live()` holds. Returns `None` once it stops holding.
    pub async fn acquire_while<F>(&self, live: F) -> Option<SlotGuard<'_>>
    where
        F: Fn() -> bool,
    {
        loop {
            if !live() {
                return None;
            }
            let released = self.released.notified();
            if let Some(guard) = self.try_acquire() {
                return Some(guard);
            }
            tokio::select! {
                _ = released => {}
                _ = tokio::time::sleep(RECHECK_INTERVAL) => {}
            }
        }
    }

    pub(super) fn release(&self) {
        let _ = self
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Relaxed, |n| n.checked_sub(1));
        self.released.notify_waiters();
    }
}

/// Cap on network retrievals within one navigation. Reset on every navigation.
#[derive(Debug)]
pub struct NavigationBudget {
    limit: usize,
    used: AtomicUsize,
}

impl NavigationBudget {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            used: AtomicUsize::new(0),
        }
    }

    /// Consume one retrieval. False once the budget is exhausted.
    pub fn try_take(&self) -> bool {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Relaxed, |n| {
                (n < self.limit).then_some(n + 1)
            })
            .is_ok()
    }

    pub fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.used())
    }

    pub fn reset(&self) {
        self.used.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn slots_acquire_and_release() {
        let slots = FetchSlots::new(2);
        assert_eq!(slots.available(), 2);
        let a = slots.try_acquire().expect("first slot");
        let b = slots.try_acquire().expect("second slot");
        assert!(slots.try_acquire().is_none());
        assert_eq!(slots.in_use(), 2);
        drop(a);
        assert_eq!(slots.available(), 1);
        drop(b);
        assert_eq!(slots.in_use(), 0);
        assert_eq!(slots.peak(), 2);
    }

    #[test]
    fn zero_max_is_treated_as_one() {
        let slots = FetchSlots::new(0);
        assert_eq!(slots.max(), 1);
    }

    #[tokio::test]
    async fn waiter_wakes_when_slot_released() {
        let slots = Arc::new(FetchSlots::new(1));
        let held = slots.try_acquire().unwrap();
        let waiter = {
            let slots = Arc::clone(&slots);
            tokio::spawn(async move {
                let _guard = slots.acquire_while(|| true).await;
                slots.in_use()
            })
        };
        tokio::task::yield_now().await;
        drop(held);
        assert_eq!(waiter.await.unwrap(), 1);
        assert_eq!(slots.in_use(), 0);
        assert_eq!(slots.peak(), 1);
    }

    #[tokio::test]
    async fn acquire_while_gives_up_when_condition_fails() {
        let slots = FetchSlots::new(1);
        let _held = slots.try_acquire().unwrap();
        let live = std::sync::atomic::AtomicBool::new(true);
        let wait = slots.acquire_while(|| live.load(Ordering::Relaxed));
        tokio::pin!(wait);
        tokio::select! {
            _ = &mut wait => panic!("no slot should be granted"),
            _ = tokio::time::sleep(Duration::from_millis(20)) => {}
        }
        live.store(false, Ordering::Relaxed);
        assert!(wait.await.is_none());
    }

    #[test]
    fn navigation_budget_exhausts_and_resets() {
        let budget = NavigationBudget::new(2);
        assert!(budget.try_take());
        assert!(budget.try_take());
        assert!(!budget.try_take());
        assert_eq!(budget.remaining(), 0);
        budget.reset();
        assert_eq!(budget.remaining(), 2);
        assert!(budget.try_take());
    }
}
