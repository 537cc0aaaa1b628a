//! Ordered extraction strategies for locating parts of a feed item.
//!
//! The host ships several markup variants for the same thing; each field
//! lists the selectors to try, first match wins.

use crate::dom::{Document, NodeId, Selector};

#[derive(Debug, Clone)]
pub enum Strategy {
    /// First descendant of the item matching the selector.
    Select(Selector),
    /// First descendant matching the second selector inside the first match of the first.
    Within(Selector, Selector),
}

impl Strategy {
    fn find(&self, doc: &Document, scope: NodeId) -> Option<NodeId> {
        match self {
            Strategy::Select(sel) => doc.select(scope, sel),
            Strategy::Within(outer, inner) => {
                let outer = doc.select(scope, outer)?;
                doc.select(outer, inner)
            }
        }
    }
}

/// Strategies for one field.
#[derive(Debug, Clone)]
pub struct FieldProbe {
    name: &'static str,
    strategies: Vec<Strategy>,
}

impl FieldProbe {
    pub fn new(name: &'static str, strategies: Vec<Strategy>) -> Self {
        Self { name, strategies }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn find(&self, doc: &Document, scope: NodeId) -> Option<NodeId> {
        self.strategies.iter().find_map(|s| s.find(doc, scope))
    }

    /// Index of the first strategy that matches.
    #[cfg(test)]
    fn matching_strategy(&self, doc: &Document, scope: NodeId) -> Option<usize> {
        self.strategies
            .iter()
            .position(|s| s.find(doc, scope).is_some())
    }
}

/// Every field the reconciler reads from an item.
#[derive(Debug, Clone)]
pub struct ItemProbes {
    pub video_link: FieldProbe,
    pub lockup: FieldProbe,
    pub metadata_model: FieldProbe,
    pub metadata_block: FieldProbe,
    pub avatar: FieldProbe,
    pub channel_link: FieldProbe,
}

impl Default for ItemProbes {
    fn default() -> Self {
        use Strategy::{Select, Within};

        let cmvm = || Selector::tag("yt-content-metadata-view-model");
        Self {
            video_link: FieldProbe::new(
                "video link",
                vec![
                    Select(Selector::tag("a").with_attr_containing("href", "/watch?v=")),
                    Select(Selector::tag("a").with_attr_containing("href", "/shorts/")),
                    Select(Selector::tag("a").with_id("video-title-link")),
                ],
            ),
            lockup: FieldProbe::new(
                "lockup",
                vec![
                    Select(Selector::class("yt-lockup-view-model")),
                    Select(Selector::tag("ytd-rich-grid-media")),
                ],
            ),
            metadata_model: FieldProbe::new(
                "metadata model",
                vec![
                    Select(cmvm()),
                    Select(Selector::tag("ytd-video-meta-block")),
                ],
            ),
            metadata_block: FieldProbe::new(
                "metadata block",
                vec![
                    Select(Selector::class("yt-lockup-metadata-view-model__metadata")),
                    Select(Selector::tag("div").with_id("metadata")),
                ],
            ),
            avatar: FieldProbe::new(
                "avatar",
                vec![
                    Select(Selector::class("yt-lockup-metadata-view-model__avatar")),
                    Select(Selector::tag("div").with_id("avatar-container")),
                ],
            ),
            channel_link: FieldProbe::new(
                "channel link",
                vec![
                    Within(cmvm(), Selector::tag("a")),
                    Select(Selector::tag("a").with_attr_containing("href", "/@")),
                    Select(Selector::tag("a").with_attr_containing("href", "/channel/")),
                ],
            ),
        }
    }
}
