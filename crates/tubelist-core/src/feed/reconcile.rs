//! Idempotent per-item transformation into the list layout, and its undo.

use std::collections::{BTreeSet, HashMap};

use crate::dom::{Document, NodeId, Selector};

use super::item::{ItemKind, VideoId};
use super::markers::{self, PlaceholderState};
use super::moves::MoveRegistry;
use super::probe::ItemProbes;

const METADATA_ROW_CLASS: &str = "yt-content-metadata-view-model__metadata-row";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Detached,
    NoLockup,
    NoMetadata,
}

/// What happened to the description slot of an augmented item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionSlot {
    Hidden,
    Filled,
    Loading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Marker matches the current identity; nothing was touched.
    AlreadyProcessed,
    /// Shorts or unrecognized item; only marked with its kind.
    Ignored(ItemKind),
    /// Expected markup missing; no markers set so the item is retried later.
    Skipped(SkipReason),
    Augmented {
        video_id: VideoId,
        description: DescriptionSlot,
    },
}

/// Applies the list layout to feed items and remembers enough to undo it.
#[derive(Debug)]
pub struct Reconciler {
    probes: ItemProbes,
    show_descriptions: bool,
    moves: MoveRegistry,
    synthetic: HashMap<NodeId, Vec<NodeId>>,
    touched: BTreeSet<NodeId>,
}

impl Reconciler {
    pub fn new(show_descriptions: bool) -> Self {
        Self {
            probes: ItemProbes::default(),
            show_descriptions,
            moves: MoveRegistry::new(),
            synthetic: HashMap::new(),
            touched: BTreeSet::new(),
        }
    }

    pub fn moves(&self) -> &MoveRegistry {
        &self.moves
    }

    /// Items carrying markers from this reconciler.
    pub fn touched(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.touched.iter().copied()
    }

    /// Current identity of an item, if its primary link is recognizable.
    pub fn identify(&self, doc: &Document, item: NodeId) -> Option<(VideoId, ItemKind)> {
        let link = self.probes.video_link.find(doc, item)?;
        VideoId::from_href(doc.attr(link, "href")?)
    }

    /// True if `item` is unmarked or marked for a different identity.
    pub fn needs_reconcile(&self, doc: &Document, item: NodeId) -> bool {
        let key = self
            .identify(doc, item)
            .map(|(id, _)| id.to_string())
            .unwrap_or_default();
        doc.attr(item, markers::PROCESSED) != Some(key.as_str())
    }

    /// Bring `item` into the augmented state for its current identity.
    /// `lookup` is consulted for an already known description.
    pub fn reconcile<F>(&mut self, doc: &mut Document, item: NodeId, lookup: F) -> Outcome
    where
        F: FnOnce(&VideoId) -> Option<String>,
    {
        if !doc.is_attached(item) {
            return Outcome::Skipped(SkipReason::Detached);
        }
        let identity = self.identify(doc, item);
        let key = identity.as_ref().map_or("", |(id, _)| id.as_str());
        match doc.attr(item, markers::PROCESSED).map(str::to_string) {
            Some(prev) if prev == key => return Outcome::AlreadyProcessed,
            Some(prev) => {
                tracing::debug!(item = item.index(), from = %prev, to = key, "item identity changed, resetting");
                self.reset_item(doc, item);
            }
            None => {}
        }

        let video_id = match identity {
            Some((id, ItemKind::Video)) => id,
            Some((id, kind)) => {
                self.mark(doc, item, id.as_str(), kind);
                return Outcome::Ignored(kind);
            }
            None => {
                self.mark(doc, item, "", ItemKind::Unrecognized);
                return Outcome::Ignored(ItemKind::Unrecognized);
            }
        };

        let Some(lockup) = self.probes.lockup.find(doc, item) else {
            tracing::trace!(item = item.index(), probe = self.probes.lockup.name(), "no match yet");
            return Outcome::Skipped(SkipReason::NoLockup);
        };
        let Some(meta_model) = self.probes.metadata_model.find(doc, lockup) else {
            tracing::trace!(item = item.index(), probe = self.probes.metadata_model.name(), "no match yet");
            return Outcome::Skipped(SkipReason::NoMetadata);
        };

        let channel_link = self.probes.channel_link.find(doc, lockup);
        let channel_href = channel_link
            .and_then(|a| doc.attr(a, "href"))
            .map(str::to_string);
        let details = detail_text(doc, meta_model, channel_link);
        let avatar = self.probes.avatar.find(doc, lockup);

        // Build detached, move host nodes in, then attach.
        let mut created = Vec::new();
        let header = synthetic(doc, "div", markers::HEADER_CLASS);
        created.push(header);
        if let Some(avatar) = avatar {
            let link = synthetic(doc, "a", markers::AVATAR_LINK_CLASS);
            if let Some(href) = &channel_href {
                doc.set_attr(link, "href", href.as_str());
            }
            doc.append_child(header, link);
            self.moves.relocate(doc, item, avatar, link);
        }
        let row = synthetic(doc, "div", markers::META_ROW_CLASS);
        doc.append_child(header, row);
        if let Some(anchor) = channel_link {
            self.moves.relocate(doc, item, anchor, row);
        }
        if !details.is_empty() {
            let span = synthetic(doc, "span", markers::META_DETAILS_CLASS);
            doc.set_text(span, details);
            doc.append_child(row, span);
        }
        doc.insert_child_at(item, 0, header);

        let description = if self.show_descriptions {
            let anchor = self.probes.metadata_block.find(doc, lockup).unwrap_or(meta_model);
            let existing = doc.select(item, &Selector::class(markers::DESCRIPTION_CLASS));
            let (placeholder, fresh) = match existing {
                Some(existing) => (existing, false),
                None => (synthetic(doc, "div", markers::DESCRIPTION_CLASS), true),
            };
            if fresh {
                if let Some(parent) = doc.parent(anchor) {
                    let next = doc.next_sibling(anchor);
                    doc.insert_before(parent, placeholder, next);
                }
            }
            created.push(placeholder);
            doc.set_attr(placeholder, markers::VIDEO_ID, video_id.as_str());
            match lookup(&video_id) {
                Some(text) => {
                    fill(doc, placeholder, &text);
                    DescriptionSlot::Filled
                }
                None => {
                    doc.set_text(placeholder, "");
                    doc.add_class(placeholder, markers::SKELETON_CLASS);
                    doc.set_attr(placeholder, markers::STATE, PlaceholderState::Loading.as_str());
                    DescriptionSlot::Loading
                }
            }
        } else {
            DescriptionSlot::Hidden
        };

        self.synthetic.insert(item, created);
        self.mark(doc, item, video_id.as_str(), ItemKind::Video);
        Outcome::Augmented {
            video_id,
            description,
        }
    }

    fn mark(&mut self, doc: &mut Document, item: NodeId, key: &str, kind: ItemKind) {
        doc.set_attr(item, markers::PROCESSED, key);
        doc.set_attr(item, markers::KIND, kind.as_str());
        self.touched.insert(item);
    }

    /// Undo everything done to `item`: drop synthetic nodes, put moved nodes
    /// back, strip markers. Returns false if the item was never touched.
    pub fn reset_item(&mut self, doc: &mut Document, item: NodeId) -> bool {
        for node in self.synthetic.remove(&item).unwrap_or_default() {
            doc.detach(node);
        }
        self.moves.restore_owner(doc, item);
        doc.remove_attr(item, markers::PROCESSED);
        doc.remove_attr(item, markers::KIND);
        self.touched.remove(&item)
    }

    /// Reset every touched item. Returns how many were reset.
    pub fn teardown(&mut self, doc: &mut Document) -> usize {
        let items: Vec<NodeId> = self.touched.iter().copied().collect();
        let n = items.len();
        for item in items {
            self.reset_item(doc, item);
        }
        self.moves.restore_all(doc);
        self.synthetic.clear();
        n
    }
}

fn synthetic(doc: &mut Document, tag: &str, class: &str) -> NodeId {
    let node = doc.create_element(tag);
    doc.add_class(node, class);
    doc.set_attr(node, markers::SYNTHETIC, "");
    node
}

fn fill(doc: &mut Document, placeholder: NodeId, text: &str) {
    doc.set_text(placeholder, text);
    doc.remove_class(placeholder, markers::SKELETON_CLASS);
    doc.set_attr(placeholder, markers::STATE, PlaceholderState::for_text(text).as_str());
}

/// Text of the metadata rows other than the one holding the channel link.
fn detail_text(doc: &Document, meta_model: NodeId, channel_link: Option<NodeId>) -> String {
    doc.select_all(meta_model, &Selector::class(METADATA_ROW_CLASS))
        .into_iter()
        .filter(|&row| channel_link.map_or(true, |a| a != row && !doc.contains(row, a)))
        .map(|row| doc.text_content(row))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" • ")
}

/// Write a resolved description into every mounted placeholder for `id`.
pub fn fill_placeholders(doc: &mut Document, id: &str, text: &str) -> usize {
    let sel = Selector::class(markers::DESCRIPTION_CLASS).with_attr_eq(markers::VIDEO_ID, id);
    let targets = doc.select_all(doc.root(), &sel);
    for &placeholder in &targets {
        fill(doc, placeholder, text);
    }
    targets.len()
}

/// Mounted placeholders still waiting for text, with their video ids.
pub fn loading_placeholders(doc: &Document) -> Vec<(NodeId, String)> {
    let sel = Selector::class(markers::DESCRIPTION_CLASS)
        .with_attr_eq(markers::STATE, PlaceholderState::Loading.as_str());
    doc.select_all(doc.root(), &sel)
        .into_iter()
        .filter_map(|p| Some((p, doc.attr(p, markers::VIDEO_ID)?.to_string())))
        .collect()
}
