//! Synthetic subscription feed.
//!
//! Renders the markup the reconciler probes for (rich grid, lockup view
//! models, avatar container, metadata rows) from a small serde description so
//! tests and `tubelist replay` can run without a browser.

use serde::{Deserialize, Serialize};

use super::{Document, NodeId, Selector};

pub const SUBSCRIPTIONS_URL: &str = "https://www.youtube.com/feed/subscriptions";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureKind {
    #[default]
    Video,
    Shorts,
    /// Item without a recognizable primary link (ads, promos).
    Other,
}

/// One feed entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureItem {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub channel_href: Option<String>,
    pub views: Option<String>,
    pub age: Option<String>,
    pub kind: FixtureKind,
    /// Omit the avatar container (layout variant without one).
    pub no_avatar: bool,
    /// Description served by an offline fetcher for this id.
    pub description: Option<String>,
}

impl FixtureItem {
    pub fn video(id: &str, title: &str, channel: &str) -> Self {
        Self {
            video_id: id.to_string(),
            title: title.to_string(),
            channel: channel.to_string(),
            views: Some("1.2K views".to_string()),
            age: Some("3 days ago".to_string()),
            ..Self::default()
        }
    }

    pub fn shorts(id: &str, title: &str) -> Self {
        Self {
            video_id: id.to_string(),
            title: title.to_string(),
            kind: FixtureKind::Shorts,
            ..Self::default()
        }
    }

    fn channel_href(&self) -> String {
        self.channel_href.clone().unwrap_or_else(|| {
            let handle: String = self.channel.chars().filter(|c| !c.is_whitespace()).collect();
            format!("/@{handle}")
        })
    }

    fn primary_href(&self) -> Option<String> {
        match self.kind {
            FixtureKind::Video => Some(format!("/watch?v={}", self.video_id)),
            FixtureKind::Shorts => Some(format!("/shorts/{}", self.video_id)),
            FixtureKind::Other => None,
        }
    }

    /// Render as a detached `ytd-rich-item-renderer`.
    pub fn render(&self, doc: &mut Document) -> NodeId {
        let item = doc.create_element("ytd-rich-item-renderer");
        let content = el(doc, item, "div", &[]);
        doc.set_attr(content, "id", "content");

        if self.kind == FixtureKind::Shorts {
            let lockup = el(doc, content, "ytm-shorts-lockup-view-model", &["shortsLockupViewModelHost"]);
            if let Some(href) = self.primary_href() {
                let a = el(doc, lockup, "a", &["shortsLockupViewModelHostEndpoint"]);
                doc.set_attr(a, "href", href);
                doc.set_text(a, &self.title);
            }
            return item;
        }

        let lockup = el(doc, content, "div", &["yt-lockup-view-model"]);
        let thumb = el(doc, lockup, "a", &["yt-lockup-view-model__content-image"]);
        if let Some(href) = self.primary_href() {
            doc.set_attr(thumb, "href", href);
        }

        let meta_model = el(doc, lockup, "div", &["yt-lockup-metadata-view-model"]);
        if !self.no_avatar {
            let avatar = el(doc, meta_model, "div", &["yt-lockup-metadata-view-model__avatar"]);
            let img = el(doc, avatar, "img", &["yt-spec-avatar-shape__image"]);
            doc.set_attr(img, "alt", &self.channel);
        }
        let text = el(doc, meta_model, "div", &["yt-lockup-metadata-view-model__text-container"]);
        let heading = el(doc, text, "h3", &["yt-lockup-metadata-view-model__heading-reset"]);
        let title = el(doc, heading, "a", &["yt-lockup-metadata-view-model__title"]);
        if let Some(href) = self.primary_href() {
            doc.set_attr(title, "href", href);
        }
        doc.set_text(title, &self.title);

        let metadata = el(doc, text, "div", &["yt-lockup-metadata-view-model__metadata"]);
        let cmvm = el(doc, metadata, "yt-content-metadata-view-model", &[]);
        let channel_row = el(doc, cmvm, "div", &["yt-content-metadata-view-model__metadata-row"]);
        let channel = el(doc, channel_row, "a", &["yt-core-attributed-string__link"]);
        doc.set_attr(channel, "href", self.channel_href());
        doc.set_text(channel, &self.channel);

        let details: Vec<&str> = [self.views.as_deref(), self.age.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !details.is_empty() {
            let row = el(doc, cmvm, "div", &["yt-content-metadata-view-model__metadata-row"]);
            for part in details {
                let span = el(doc, row, "span", &["yt-content-metadata-view-model__metadata-text"]);
                doc.set_text(span, part);
            }
        }
        item
    }
}

fn el(doc: &mut Document, parent: NodeId, tag: &str, classes: &[&str]) -> NodeId {
    let node = doc.create_element(tag);
    for class in classes {
        doc.add_class(node, class);
    }
    doc.append_child(parent, node);
    node
}

/// A whole feed page as loaded from a fixture file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedBuilder {
    pub url: Option<String>,
    pub items: Vec<FixtureItem>,
    /// Items inside a `ytd-rich-section-renderer` shelf; never augmented.
    pub shelf: Vec<FixtureItem>,
}

impl FeedBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn item(mut self, item: FixtureItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn shelf_item(mut self, item: FixtureItem) -> Self {
        self.shelf.push(item);
        self
    }

    /// Render the page: `ytd-browse > ytd-rich-grid-renderer > #contents > items`,
    /// with the shelf (if any) inserted after the first item.
    pub fn build(&self) -> Document {
        let url = self.url.as_deref().unwrap_or(SUBSCRIPTIONS_URL);
        let mut doc = Document::new(url);
        let root = doc.root();
        let browse = el(&mut doc, root, "ytd-browse", &[]);
        let grid = el(&mut doc, browse, "ytd-rich-grid-renderer", &[]);
        let contents = el(&mut doc, grid, "div", &[]);
        doc.set_attr(contents, "id", "contents");

        for (i, item) in self.items.iter().enumerate() {
            let node = item.render(&mut doc);
            doc.append_child(contents, node);
            if i == 0 && !self.shelf.is_empty() {
                let section = el(&mut doc, contents, "ytd-rich-section-renderer", &[]);
                let shelf = el(&mut doc, section, "ytd-rich-shelf-renderer", &[]);
                for s in &self.shelf {
                    let node = s.render(&mut doc);
                    doc.append_child(shelf, node);
                }
            }
        }
        doc
    }

    /// Description text an offline fetcher should serve for `video_id`.
    pub fn description_for(&self, video_id: &str) -> Option<&str> {
        self.items
            .iter()
            .chain(&self.shelf)
            .find(|i| i.video_id == video_id)
            .and_then(|i| i.description.as_deref())
    }
}

/// The `#contents` container of the rich grid, where the host appends items.
pub fn feed_contents(doc: &Document) -> Option<NodeId> {
    let grid = doc.select(doc.root(), &Selector::tag("ytd-rich-grid-renderer"))?;
    doc.select(grid, &Selector::tag("div").with_id("contents"))
}

/// Host-side insertion of more items (virtual scroll growth). Returns the new item nodes.
pub fn append_items(doc: &mut Document, items: &[FixtureItem]) -> Vec<NodeId> {
    let Some(contents) = feed_contents(doc) else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| {
            let node = item.render(doc);
            doc.append_child(contents, node);
            node
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_grid_with_shelf_after_first_item() {
        let doc = FeedBuilder::new()
            .item(FixtureItem::video("aaaaaaaaaaa", "One", "Chan A"))
            .item(FixtureItem::video("bbbbbbbbbbb", "Two", "Chan B"))
            .shelf_item(FixtureItem::shorts("sssssssssss", "Short"))
            .build();
        let items = doc.select_all(doc.root(), &Selector::tag("ytd-rich-item-renderer"));
        assert_eq!(items.len(), 3);
        let contents = feed_contents(&doc).unwrap();
        let tags: Vec<&str> = doc.children(contents).iter().map(|&c| doc.tag(c)).collect();
        assert_eq!(
            tags,
            ["ytd-rich-item-renderer", "ytd-rich-section-renderer", "ytd-rich-item-renderer"]
        );
        assert_eq!(doc.location(), SUBSCRIPTIONS_URL);
    }

    #[test]
    fn video_item_has_channel_link_and_details() {
        let mut doc = Document::new(SUBSCRIPTIONS_URL);
        let item = FixtureItem::video("aaaaaaaaaaa", "One", "Chan A").render(&mut doc);
        let link = doc
            .select(item, &Selector::tag("a").with_attr_containing("href", "/@"))
            .unwrap();
        assert_eq!(doc.attr(link, "href"), Some("/@ChanA"));
        let cmvm = doc
            .select(item, &Selector::tag("yt-content-metadata-view-model"))
            .unwrap();
        assert_eq!(doc.text_content(cmvm), "Chan A 1.2K views 3 days ago");
    }

    #[test]
    fn parses_fixture_json_with_defaults() {
        let feed = FeedBuilder::from_json(
            r#"{"items":[{"video_id":"abc123abc12","title":"T","channel":"C","description":"Hi."}]}"#,
        )
        .unwrap();
        assert_eq!(feed.items[0].kind, FixtureKind::Video);
        assert_eq!(feed.description_for("abc123abc12"), Some("Hi."));
        assert!(feed.shelf.is_empty());
    }

    #[test]
    fn append_items_grows_contents() {
        let mut doc = FeedBuilder::new()
            .item(FixtureItem::video("aaaaaaaaaaa", "One", "A"))
            .build();
        let added = append_items(&mut doc, &[FixtureItem::video("bbbbbbbbbbb", "Two", "B")]);
        assert_eq!(added.len(), 1);
        assert!(doc.is_attached(added[0]));
    }
}
