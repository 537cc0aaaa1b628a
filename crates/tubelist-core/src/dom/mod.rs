//! Host page model.
//!
//! An arena of element nodes exposing exactly what the reconciler needs from
//! the page: read-only queries over tags, classes, attributes and text, plus
//! targeted mutation (create, insert, relocate, detach). Detached nodes stay
//! in the arena so they can be re-attached; node ids are never reused.

mod fixture;
mod selector;

use std::collections::BTreeMap;

pub use fixture::{
    append_items, feed_contents, FeedBuilder, FixtureItem, FixtureKind, SUBSCRIPTIONS_URL,
};
pub use selector::{AttrMatch, Selector};

/// Handle to one element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// The page: a rooted element tree plus the current location.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    location: String,
}

impl Document {
    /// Empty page whose root is a `body` element.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node::new("body")],
            root: NodeId(0),
            location: location.into(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_location(&mut self, url: impl Into<String>) {
        self.location = url.into();
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Node::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    pub fn tag(&self, id: NodeId) -> &str {
        &self.node(id).tag
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.index_in_parent(id)?;
        self.children(parent).get(idx + 1).copied()
    }

    /// Remove `id` from its parent. Returns the old parent and index.
    pub fn detach(&mut self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let idx = self.index_in_parent(id)?;
        self.node_mut(parent).children.remove(idx);
        self.node_mut(id).parent = None;
        Some((parent, idx))
    }

    /// Insert `child` into `parent` at `index` (clamped), moving it from wherever it was.
    /// Inserting a node into itself or its own subtree is ignored.
    pub fn insert_child_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if child == parent || self.contains(child, parent) {
            return;
        }
        self.detach(child);
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_child_at(parent, usize::MAX, child);
    }

    /// Insert `child` before `reference` (or at the end when `None` or not a child of `parent`).
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if reference == Some(child) {
            return;
        }
        self.detach(child);
        let index = reference
            .filter(|&r| self.parent(r) == Some(parent))
            .and_then(|r| self.index_in_parent(r))
            .unwrap_or(usize::MAX);
        self.insert_child_at(parent, index, child);
    }

    /// True if `node` is a strict descendant of `ancestor`.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = self.parent(node);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.parent(p);
        }
        false
    }

    /// True if `node` is reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        node == self.root || self.contains(self.root, node)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        self.node_mut(id).attrs.insert(name.to_string(), value.into());
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.node_mut(id).attrs.remove(name)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id).classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            self.node_mut(id).classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        self.node_mut(id).classes.retain(|c| c != class);
    }

    pub fn classes(&self, id: NodeId) -> &[String] {
        &self.node(id).classes
    }

    /// Own text of an element (not including descendants).
    pub fn text(&self, id: NodeId) -> &str {
        &self.node(id).text
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.node_mut(id).text = text.into();
    }

    /// Whitespace-normalized concatenation of own and descendant text.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            let node = self.node(n);
            if !node.text.trim().is_empty() {
                parts.push(node.text.trim());
            }
            stack.extend(node.children.iter().rev());
        }
        parts.join(" ")
    }

    /// Descendants of `id` in document (pre-)order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev());
        }
        out
    }

    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        selector.matches(self, id)
    }

    /// First descendant of `scope` matching `selector`, in document order.
    pub fn select(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&n| selector.matches(self, n))
    }

    /// All descendants of `scope` matching `selector`, in document order.
    pub fn select_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| selector.matches(self, n))
            .collect()
    }

    /// Nearest strict ancestor of `id` matching `selector`.
    pub fn closest_ancestor(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            if selector.matches(self, p) {
                return Some(p);
            }
            cur = self.parent(p);
        }
        None
    }
}
