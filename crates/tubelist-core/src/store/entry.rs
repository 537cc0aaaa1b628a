//! Description entries shared by the volatile and persistent tiers.

use std::time::{SystemTime, UNIX_EPOCH};

/// A summarized description and the instant it was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionEntry {
    pub text: String,
    /// Unix time in milliseconds.
    pub stored_at_ms: u64,
}

impl DescriptionEntry {
    pub fn new(text: impl Into<String>, stored_at_ms: u64) -> Self {
        Self {
            text: text.into(),
            stored_at_ms,
        }
    }

    /// An entry is expired once `now - stored >= ttl`.
    pub fn is_expired(&self, now_ms: u64, ttl_ms: u64) -> bool {
        now_ms.saturating_sub(self.stored_at_ms) >= ttl_ms
    }
}

/// Current wall-clock time as Unix milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
