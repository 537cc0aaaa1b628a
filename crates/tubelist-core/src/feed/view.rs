//! Read-only summary of augmented items, for reporting.

use serde::Serialize;

use crate::dom::{Document, NodeId, Selector};

use super::markers;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    pub video_id: Option<String>,
    pub kind: Option<String>,
    /// Text of the synthetic metadata row (channel and details).
    pub header: Option<String>,
    pub description: Option<String>,
    pub state: Option<String>,
}

impl ItemView {
    pub fn of(doc: &Document, item: NodeId) -> Self {
        let row = doc.select(item, &Selector::class(markers::META_ROW_CLASS));
        let placeholder = doc.select(item, &Selector::class(markers::DESCRIPTION_CLASS));
        Self {
            video_id: doc
                .attr(item, markers::PROCESSED)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            kind: doc.attr(item, markers::KIND).map(str::to_string),
            header: row.map(|r| doc.text_content(r)),
            description: placeholder.map(|p| doc.text(p).to_string()),
            state: placeholder
                .and_then(|p| doc.attr(p, markers::STATE))
                .map(str::to_string),
        }
    }
}

/// Views of every feed item on the page, in document order.
pub fn item_views(doc: &Document) -> Vec<ItemView> {
    super::scan_items(doc)
        .into_iter()
        .map(|item| ItemView::of(doc, item))
        .collect()
}
