//! tally-config
//!
//! Persistent settings for Tally: which storage backend to open, where its
//! data lives, and the validation and display defaults.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{BackendKind, Config};
