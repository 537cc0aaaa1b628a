//! RAII guard that releases a fetch slot when dropped.

use super::budget::FetchSlots;

/// Holds one in-flight slot; released on drop.
#[derive(Debug)]
pub struct SlotGuard<'a> {
    slots: &'a FetchSlots,
}

impl<'a> SlotGuard<'a> {
    pub(super) fn new(slots: &'a FetchSlots) -> Self {
        Self { slots }
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.slots.release();
    }
}
