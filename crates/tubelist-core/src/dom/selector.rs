//! Compound selectors: tag, class, id and one attribute condition, all optional.

use super::{Document, NodeId};

/// Attribute condition of a [`Selector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrMatch {
    Present(String),
    Equals(String, String),
    Contains(String, String),
}

impl AttrMatch {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        match self {
            AttrMatch::Present(name) => doc.attr(node, name).is_some(),
            AttrMatch::Equals(name, value) => doc.attr(node, name) == Some(value.as_str()),
            AttrMatch::Contains(name, needle) => doc
                .attr(node, name)
                .is_some_and(|v| v.contains(needle.as_str())),
        }
    }
}

/// Conjunction of simple conditions, e.g. `a[href*="/watch"]` or `div.lv-header`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    class: Option<String>,
    id: Option<String>,
    attr: Option<AttrMatch>,
}

impl Selector {
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            ..Self::default()
        }
    }

    pub fn class(class: &str) -> Self {
        Self {
            class: Some(class.to_string()),
            ..Self::default()
        }
    }

    pub fn id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::default()
        }
    }

    pub fn attr(name: &str) -> Self {
        Self::default().with_attr(name)
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str) -> Self {
        self.attr = Some(AttrMatch::Present(name.to_string()));
        self
    }

    pub fn with_attr_eq(mut self, name: &str, value: &str) -> Self {
        self.attr = Some(AttrMatch::Equals(name.to_string(), value.to_string()));
        self
    }

    pub fn with_attr_containing(mut self, name: &str, needle: &str) -> Self {
        self.attr = Some(AttrMatch::Contains(name.to_string(), needle.to_string()));
        self
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if doc.tag(node) != tag {
                return false;
            }
        }
        if let Some(class) = &self.class {
            if !doc.has_class(node, class) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if doc.attr(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        match &self.attr {
            Some(cond) => cond.matches(doc, node),
            None => true,
        }
    }
}
