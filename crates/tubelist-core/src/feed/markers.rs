//! Attribute and class names written onto the host page.

/// On a feed item: the video id it was augmented for.
pub const PROCESSED: &str = "data-lv-processed";
/// On a feed item: `video`, `shorts` or `unrecognized`.
pub const KIND: &str = "data-lv-kind";
/// On every node created by the reconciler.
pub const SYNTHETIC: &str = "data-lv-synthetic";
/// On a description placeholder: the video id it displays.
pub const VIDEO_ID: &str = "data-lv-video-id";
/// On a description placeholder: see [`PlaceholderState`].
pub const STATE: &str = "data-lv-state";

pub const HEADER_CLASS: &str = "lv-header";
pub const AVATAR_LINK_CLASS: &str = "lv-avatar-link";
pub const META_ROW_CLASS: &str = "lv-meta-row";
pub const META_DETAILS_CLASS: &str = "lv-meta-details";
pub const DESCRIPTION_CLASS: &str = "lv-description";
pub const SKELETON_CLASS: &str = "lv-skeleton";

/// Host attribute on `ytd-browse` that switches its stylesheet to the list layout.
pub const PAGE_SUBTYPE: &str = "page-subtype";
pub const PAGE_SUBTYPE_LIST: &str = "subscriptions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderState {
    Loading,
    Ready,
    Empty,
}

impl PlaceholderState {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaceholderState::Loading => "loading",
            PlaceholderState::Ready => "ready",
            PlaceholderState::Empty => "empty",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "loading" => Some(PlaceholderState::Loading),
            "ready" => Some(PlaceholderState::Ready),
            "empty" => Some(PlaceholderState::Empty),
            _ => None,
        }
    }

    pub fn for_text(text: &str) -> Self {
        if text.is_empty() {
            PlaceholderState::Empty
        } else {
            PlaceholderState::Ready
        }
    }
}
