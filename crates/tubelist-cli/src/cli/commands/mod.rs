//! CLI command handlers. Each command is in its own file.

mod describe;
mod replay;
mod settings;
mod store;

pub use describe::run_describe;
pub use replay::{run_replay, ReplayOptions};
pub use settings::{run_settings, SettingsUpdate};
pub use store::run_store;
