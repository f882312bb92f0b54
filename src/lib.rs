//! Tsukiyo Bot
//!
//! A chat bot that reacts to platform events and keeps its state in small
//! JSON documents on local disk.
//!
//! # Modules
//!
//! - `store`: Document store with per-path locking and name resolution
//! - `bootstrap`: Data directory setup and cache seeding from `metadata.json`
//! - `bot`: Gateway events, actions, dispatcher and handlers
//! - `config`: Environment-driven configuration
//!
//! # Example
//!
//! ```no_run
//! use serde_json::json;
//! use tsukiyo_bot::{DocumentStore, StoreConfig};
//!
//! # async fn demo() {
//! let store = DocumentStore::new(StoreConfig::new("/srv/tsukiyo"));
//! store.write("settings", json!({"prefix": "!"})).await;
//! let settings = store.read("settings").await;
//! assert_eq!(settings["prefix"], "!");
//! store.delete("settings", "prefix").await;
//! # }
//! ```

pub mod bootstrap;
pub mod bot;
pub mod config;
pub mod store;

// Re-export commonly used items at crate root
pub use bootstrap::{bootstrap, BootstrapReport};
pub use bot::{Action, Dispatcher, EventHandler, GatewayEvent};
pub use config::BotConfig;
pub use store::{Document, DocumentInput, DocumentStore, LockTable, StoreConfig, StoreError, StoreResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
