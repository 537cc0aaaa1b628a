//! Events delivered to the controller by the host page binding.

use std::fmt;

use crate::dom::{Document, NodeId};
use crate::settings::ViewMode;

/// A change the host page makes to its own tree. Returns the nodes it inserted,
/// which the controller observes like a mutation record.
pub type HostMutation = Box<dyn FnOnce(&mut Document) -> Vec<NodeId> + Send>;

pub enum HostEvent {
    /// Single-page navigation began; processing pauses.
    NavigateStart,
    /// Navigation finished at `url`.
    NavigateFinish { url: String },
    /// Location changed without lifecycle events (back/forward). Noticed by
    /// location polling.
    Popstate { url: String },
    /// Nodes were inserted into the page.
    ItemsInserted(Vec<NodeId>),
    /// The host mutates its tree; inserted nodes are observed.
    HostMutation(HostMutation),
    SetViewMode(ViewMode),
    Shutdown,
}

impl HostEvent {
    pub fn mutation<F>(f: F) -> Self
    where
        F: FnOnce(&mut Document) -> Vec<NodeId> + Send + 'static,
    {
        HostEvent::HostMutation(Box::new(f))
    }
}

impl fmt::Debug for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostEvent::NavigateStart => f.write_str("NavigateStart"),
            HostEvent::NavigateFinish { url } => {
                f.debug_struct("NavigateFinish").field("url", url).finish()
            }
            HostEvent::Popstate { url } => f.debug_struct("Popstate").field("url", url).finish(),
            HostEvent::ItemsInserted(nodes) => {
                f.debug_tuple("ItemsInserted").field(&nodes.len()).finish()
            }
            HostEvent::HostMutation(_) => f.write_str("HostMutation(..)"),
            HostEvent::SetViewMode(mode) => f.debug_tuple("SetViewMode").field(mode).finish(),
            HostEvent::Shutdown => f.write_str("Shutdown"),
        }
    }
}
