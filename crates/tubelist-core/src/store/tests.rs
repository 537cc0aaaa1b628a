//! Tests for expiry, eviction and persistence of the description store.

use std::time::Duration;

use crate::config::StoreConfig;
use crate::kv::KvStore;

use super::{DescriptionStore, PersistedStore, STORE_KEY};

const MINUTE_MS: u64 = 60_000;

fn cfg(ttl_minutes: u64, max_entries: usize) -> StoreConfig {
    StoreConfig {
        ttl_minutes,
        max_entries,
        write_debounce_ms: 20,
        prune_interval_secs: 600,
    }
}

#[test]
fn get_returns_fresh_entry() {
    let store = DescriptionStore::memory(cfg(60, 10));
    store.set_at("abc123", "hello", 1_000);
    assert_eq!(store.get_at("abc123", 1_000 + 59 * MINUTE_MS).as_deref(), Some("hello"));
}

#[test]
fn expired_entry_is_absent_and_removed() {
    let store = DescriptionStore::memory(cfg(60, 10));
    store.set_at("abc123", "hello", 1_000);
    assert_eq!(store.get_at("abc123", 1_000 + 60 * MINUTE_MS), None);
    assert_eq!(store.len(), 0, "expired entry is deleted on read");
}

#[test]
fn empty_descriptions_are_cached() {
    let store = DescriptionStore::memory(cfg(60, 10));
    store.set_at("none", "", 5);
    assert_eq!(store.get_at("none", 6).as_deref(), Some(""));
}

#[test]
fn eviction_drops_oldest_by_timestamp() {
    let store = DescriptionStore::memory(cfg(60, 1200));
    for i in 0..1201u64 {
        store.set_at(&format!("vid{i}"), "d", 10_000 + i);
    }
    assert_eq!(store.len(), 1200);
    let now = 10_000 + 1201;
    assert_eq!(store.get_at("vid0", now), None, "earliest entry evicted");
    assert!(store.get_at("vid1", now).is_some());
    assert!(store.get_at("vid1200", now).is_some());
}

#[test]
fn eviction_ignores_access_order() {
    let store = DescriptionStore::memory(cfg(60, 2));
    store.set_at("old", "a", 100);
    store.set_at("mid", "b", 200);
    // Reading "old" does not refresh it.
    assert!(store.get_at("old", 250).is_some());
    store.set_at("new", "c", 300);
    assert_eq!(store.get_at("old", 300), None);
    assert!(store.get_at("mid", 300).is_some());
    assert!(store.get_at("new", 300).is_some());
}

#[test]
fn just_inserted_entry_survives_timestamp_ties() {
    let store = DescriptionStore::memory(cfg(60, 1));
    store.set_at("b", "first", 100);
    store.set_at("a", "second", 100);
    assert_eq!(store.get_at("a", 100).as_deref(), Some("second"));
    assert_eq!(store.len(), 1);
}

#[test]
fn prune_removes_only_expired() {
    let store = DescriptionStore::memory(cfg(1, 10));
    store.set_at("old", "x", 0);
    store.set_at("fresh", "y", MINUTE_MS);
    assert_eq!(store.prune_at(MINUTE_MS + 1), 1);
    assert_eq!(store.len(), 1);
    assert!(store.get_at("fresh", MINUTE_MS + 1).is_some());
}

#[test]
fn stats_report_counts_and_bounds() {
    let store = DescriptionStore::memory(cfg(1, 10));
    store.set_at("a", "", 0);
    store.set_at("b", "text", 30_000);
    let stats = store.stats_at(MINUTE_MS);
    assert_eq!(stats.entries, 2);
    assert_eq!(stats.expired, 1);
    assert_eq!(stats.empty, 1);
    assert_eq!(stats.oldest_ms, Some(0));
    assert_eq!(stats.newest_ms, Some(30_000));
}

#[tokio::test]
async fn flush_then_reload_restores_entries() {
    let kv = KvStore::open_memory().await.unwrap();
    let store = DescriptionStore::new(Some(kv.clone()), cfg(60, 10));
    store.ensure_loaded().await;
    store.set("abc123", "a description");
    store.flush().await.unwrap();

    let json = kv.get(STORE_KEY).await.unwrap().expect("record written");
    let persisted: PersistedStore = serde_json::from_str(&json).unwrap();
    assert_eq!(persisted["abc123"].text, "a description");
    assert!(json.contains("storedTime"));

    let reloaded = DescriptionStore::new(Some(kv), cfg(60, 10));
    assert!(reloaded.get("abc123").is_none(), "nothing before load");
    reloaded.ensure_loaded().await;
    assert_eq!(reloaded.get("abc123").as_deref(), Some("a description"));
}

#[tokio::test]
async fn corrupted_record_is_treated_as_empty() {
    let kv = KvStore::open_memory().await.unwrap();
    kv.set(STORE_KEY, "{not json").await.unwrap();
    let store = DescriptionStore::new(Some(kv), cfg(60, 10));
    store.ensure_loaded().await;
    assert!(store.is_empty());
    store.set("x", "y");
    assert_eq!(store.get("x").as_deref(), Some("y"));
}

#[tokio::test]
async fn load_keeps_entries_written_before_load() {
    let kv = KvStore::open_memory().await.unwrap();
    kv.set(
        STORE_KEY,
        &format!(
            r#"{{"v1":{{"storedTime":{},"text":"persisted"}}}}"#,
            super::now_ms()
        ),
    )
    .await
    .unwrap();
    let store = DescriptionStore::new(Some(kv), cfg(60, 10));
    store.set("v1", "fresh");
    store.ensure_loaded().await;
    assert_eq!(store.get("v1").as_deref(), Some("fresh"));
}

#[tokio::test]
async fn load_skips_expired_records() {
    let kv = KvStore::open_memory().await.unwrap();
    kv.set(STORE_KEY, r#"{"ancient":{"storedTime":0,"text":"gone"}}"#)
        .await
        .unwrap();
    let store = DescriptionStore::new(Some(kv), cfg(60, 10));
    store.ensure_loaded().await;
    assert!(store.get("ancient").is_none());
}

#[tokio::test]
async fn debounced_write_coalesces_rapid_sets() {
    let kv = KvStore::open_memory().await.unwrap();
    let store = DescriptionStore::new(Some(kv.clone()), cfg(60, 10));
    store.ensure_loaded().await;
    store.set("a", "1");
    store.set("b", "2");
    store.set("c", "3");
    assert!(kv.get(STORE_KEY).await.unwrap().is_none(), "write is deferred");

    tokio::time::sleep(Duration::from_millis(300)).await;
    let json = kv.get(STORE_KEY).await.unwrap().expect("debounced write happened");
    let persisted: PersistedStore = serde_json::from_str(&json).unwrap();
    assert_eq!(persisted.len(), 3);
}
