//! Launcher configuration persistence.
//!
//! The launcher remembers the last executable, model, port and auto-start
//! flag between runs. The record is a small JSON document; loading is
//! forgiving (each field falls back to its default on its own) and saving
//! replaces the whole document atomically.

mod error;
mod store;

pub use error::ConfigError;
pub use store::{
    CONFIG_DIR_ENV, CONFIG_FILE_NAME, ConfigStore, JsonConfigStore, LauncherConfig,
    default_config_dir,
};
