//! Serializable form of the store, as written under the `descriptionCache` key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::entry::DescriptionEntry;

/// One persisted record: `{ "storedTime": <ms>, "text": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEntry {
    pub stored_time: u64,
    #[serde(default)]
    pub text: String,
}

/// Whole-store mapping from video id to record.
pub type PersistedStore = HashMap<String, PersistedEntry>;

pub(super) fn to_snapshot(entries: &HashMap<String, DescriptionEntry>) -> PersistedStore {
    entries
        .iter()
        .map(|(id, e)| {
            (
                id.clone(),
                PersistedEntry {
                    stored_time: e.stored_at_ms,
                    text: e.text.clone(),
                },
            )
        })
        .collect()
}

pub(super) fn from_snapshot(snapshot: PersistedStore) -> impl Iterator<Item = (String, DescriptionEntry)> {
    snapshot
        .into_iter()
        .map(|(id, pe)| (id, DescriptionEntry::new(pe.text, pe.stored_time)))
}
