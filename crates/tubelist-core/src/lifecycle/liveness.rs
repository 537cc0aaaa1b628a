//! Navigation liveness: a shared generation counter plus an active flag.
//!
//! Every activation hands out a `NavToken` for the new generation. Work that
//! finishes later (fetch completions, waiting fetches) checks its token before
//! touching the page; invalidation makes every outstanding token stale.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct Liveness {
    generation: AtomicU64,
    active: AtomicBool,
}

impl Liveness {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Start a new generation and mark it active.
    pub fn begin(self: &Arc<Self>) -> NavToken {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.active.store(true, Ordering::Release);
        NavToken {
            liveness: Arc::clone(self),
            generation,
        }
    }

    /// Stale every outstanding token.
    pub fn invalidate(&self) {
        self.active.store(false, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

/// Handle for one navigation generation.
#[derive(Debug, Clone)]
pub struct NavToken {
    liveness: Arc<Liveness>,
    generation: u64,
}

impl NavToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while the navigation this token belongs to is still current.
    pub fn is_live(&self) -> bool {
        self.liveness.is_active() && self.liveness.generation() == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_invalidates_previous_generation() {
        let live = Liveness::new();
        let first = live.begin();
        assert!(first.is_live());
        let second = live.begin();
        assert!(!first.is_live());
        assert!(second.is_live());
        assert_eq!(second.generation(), first.generation() + 1);
    }

    #[test]
    fn invalidate_kills_current_token() {
        let live = Liveness::new();
        let token = live.begin();
        live.invalidate();
        assert!(!token.is_live());
        assert!(!live.is_active());
    }
}
