//! Key-value persistence (SQLite via sqlx).
//!
//! Plays the role of the browser's extension storage: a flat string→string
//! table where each record holds one JSON document (the description cache,
//! user settings).

mod db;

pub use db::KvStore;
