//! Work queues and fetch admission.
//!
//! - `DiscoveryQueue`: newly observed feed items, reconciled in small batches
//!   per idle turn so bulk insertions don't starve the controller.
//! - `FetchQueue`: video ids awaiting descriptions, pumped FIFO up to the
//!   concurrency cap.
//! - `FetchSlots` / `NavigationBudget`: the engine's in-flight cap and the
//!   per-navigation cap on network retrievals.

mod budget;
mod discovery;
mod fetch_queue;
mod guard;

pub use budget::{FetchSlots, NavigationBudget};
pub use discovery::DiscoveryQueue;
pub use fetch_queue::FetchQueue;
pub use guard::SlotGuard;
