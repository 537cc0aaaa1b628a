pub mod config;
pub mod logging;

pub mod cache;
pub mod describe;
pub mod dom;
pub mod feed;
pub mod kv;
pub mod lifecycle;
pub mod retry;
pub mod scheduler;
pub mod settings;
pub mod store;

