//! Feed item discovery and the list-layout reconciler.

pub mod markers;

mod item;
mod moves;
mod probe;
mod reconcile;
mod view;

use crate::dom::{Document, NodeId, Selector};

pub use item::{ItemKind, VideoId};
pub use moves::MoveRegistry;
pub use probe::{FieldProbe, ItemProbes, Strategy};
pub use reconcile::{
    fill_placeholders, loading_placeholders, DescriptionSlot, Outcome, Reconciler, SkipReason,
};
pub use view::{item_views, ItemView};

const ITEM_TAG: &str = "ytd-rich-item-renderer";
const SHELF_TAG: &str = "ytd-rich-section-renderer";

/// Feed items at or below `nodes`, in document order, excluding items inside
/// shelves and nodes no longer attached.
pub fn collect_items(doc: &Document, nodes: &[NodeId]) -> Vec<NodeId> {
    let item_sel = Selector::tag(ITEM_TAG);
    let shelf_sel = Selector::tag(SHELF_TAG);
    let mut out = Vec::new();
    for &node in nodes {
        if !doc.is_attached(node) {
            continue;
        }
        let own = doc.matches(node, &item_sel).then_some(node);
        for candidate in own.into_iter().chain(doc.select_all(node, &item_sel)) {
            if doc.closest_ancestor(candidate, &shelf_sel).is_none() && !out.contains(&candidate) {
                out.push(candidate);
            }
        }
    }
    out
}

/// Every feed item on the page.
pub fn scan_items(doc: &Document) -> Vec<NodeId> {
    collect_items(doc, &[doc.root()])
}

/// Switch the host's browse container between list and grid styling.
/// Returns false when no browse container is mounted.
pub fn set_list_layout(doc: &mut Document, list: bool) -> bool {
    let Some(browse) = doc.select(doc.root(), &Selector::tag("ytd-browse")) else {
        return false;
    };
    if list {
        doc.set_attr(browse, markers::PAGE_SUBTYPE, markers::PAGE_SUBTYPE_LIST);
    } else if doc.attr(browse, markers::PAGE_SUBTYPE) == Some(markers::PAGE_SUBTYPE_LIST) {
        doc.remove_attr(browse, markers::PAGE_SUBTYPE);
    }
    true
}

/// True if the browse container currently carries the list styling.
pub fn is_list_layout(doc: &Document) -> bool {
    doc.select(doc.root(), &Selector::tag("ytd-browse"))
        .is_some_and(|b| doc.attr(b, markers::PAGE_SUBTYPE) == Some(markers::PAGE_SUBTYPE_LIST))
}

#[cfg(test)]
mod tests;
