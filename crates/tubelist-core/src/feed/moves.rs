//! Registry of host nodes relocated into synthetic containers.

use std::collections::{HashMap, HashSet};

use crate::dom::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MoveRecord {
    node: NodeId,
    parent: NodeId,
    index: usize,
}

/// Original parent and sibling index of every moved node, grouped by the item
/// that owns the move. A node is moved at most once until restored.
#[derive(Debug, Default)]
pub struct MoveRegistry {
    by_owner: HashMap<NodeId, Vec<MoveRecord>>,
    moved: HashSet<NodeId>,
}

impl MoveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `node` to the end of `new_parent`, recording where it came from.
    /// Refuses (returns false) if the node was already moved or has no parent.
    pub fn relocate(
        &mut self,
        doc: &mut Document,
        owner: NodeId,
        node: NodeId,
        new_parent: NodeId,
    ) -> bool {
        if self.moved.contains(&node) {
            return false;
        }
        let (Some(parent), Some(index)) = (doc.parent(node), doc.index_in_parent(node)) else {
            return false;
        };
        doc.append_child(new_parent, node);
        if doc.parent(node) != Some(new_parent) {
            return false;
        }
        self.moved.insert(node);
        self.by_owner
            .entry(owner)
            .or_default()
            .push(MoveRecord { node, parent, index });
        true
    }

    pub fn len(&self) -> usize {
        self.moved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moved.is_empty()
    }

    /// Put back everything moved for `owner`, newest move first.
    pub fn restore_owner(&mut self, doc: &mut Document, owner: NodeId) -> usize {
        let Some(records) = self.by_owner.remove(&owner) else {
            return 0;
        };
        let n = records.len();
        for rec in records.into_iter().rev() {
            doc.insert_child_at(rec.parent, rec.index, rec.node);
            self.moved.remove(&rec.node);
        }
        n
    }

    pub fn restore_all(&mut self, doc: &mut Document) -> usize {
        let owners: Vec<NodeId> = self.by_owner.keys().copied().collect();
        owners
            .into_iter()
            .map(|owner| self.restore_owner(doc, owner))
            .sum()
    }
}
