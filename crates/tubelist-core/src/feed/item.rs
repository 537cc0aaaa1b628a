//! Feed item identity: video id and kind derived from the primary link.

use std::fmt;

use url::Url;

const SITE_BASE: &str = "https://www.youtube.com/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Video,
    Shorts,
    Unrecognized,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Video => "video",
            ItemKind::Shorts => "shorts",
            ItemKind::Unrecognized => "unrecognized",
        }
    }
}

/// Stable identifier of the content behind a feed item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VideoId(String);

impl VideoId {
    /// Accepts the id alphabet (`A-Z a-z 0-9 - _`), non-empty.
    pub fn parse(s: &str) -> Option<Self> {
        let valid = !s.is_empty()
            && s.len() <= 64
            && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        valid.then(|| VideoId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive id and kind from an item link (`/watch?v=ID` or `/shorts/ID`),
    /// relative or absolute.
    pub fn from_href(href: &str) -> Option<(VideoId, ItemKind)> {
        let base = Url::parse(SITE_BASE).ok()?;
        let url = base.join(href).ok()?;
        let mut segments = url.path_segments()?;
        match segments.next()? {
            "watch" => {
                let v = url.query_pairs().find(|(k, _)| k == "v")?.1;
                Some((VideoId::parse(&v)?, ItemKind::Video))
            }
            "shorts" => Some((VideoId::parse(segments.next()?)?, ItemKind::Shorts)),
            _ => None,
        }
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_links_relative_and_absolute() {
        let (id, kind) = VideoId::from_href("/watch?v=dQw4w9WgXcQ&t=10s").unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
        assert_eq!(kind, ItemKind::Video);
        let (id, _) = VideoId::from_href("https://www.youtube.com/watch?list=x&v=abc123").unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn shorts_links() {
        let (id, kind) = VideoId::from_href("/shorts/Zx_9-aa").unwrap();
        assert_eq!(id.as_str(), "Zx_9-aa");
        assert_eq!(kind, ItemKind::Shorts);
    }

    #[test]
    fn rejects_other_links_and_bad_ids() {
        assert!(VideoId::from_href("/@channel").is_none());
        assert!(VideoId::from_href("/watch").is_none());
        assert!(VideoId::from_href("/watch?v=").is_none());
        assert!(VideoId::from_href("/watch?v=a%20b").is_none());
    }
}
