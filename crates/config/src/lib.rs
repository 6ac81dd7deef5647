//! Configuration for the waggle gateway.
//!
//! A single `waggle.toml` (discovered in the working directory, then
//! `~/.config/waggle/`) carries the server binding, Telegram credentials,
//! flow tuning, storage location, and the full UI text catalog. Every field
//! has a default so the gateway starts with an empty config file.

pub mod loader;
pub mod schema;

pub use {
    loader::{discover_and_load, load_config},
    schema::{FlowConfig, ServerConfig, StorageConfig, TelegramSection, UiCatalog, WaggleConfig},
};
