//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!
//! routes file (proxy JSON export)
//!     → loader.rs (decode into the routing tree)
//!
//! On routes change (watch mode):
//!     watcher.rs detects write
//!     → loader.rs re-reads the tree
//!     → new tree delivered over a channel
//!     → caller re-runs reconciliation
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The API key never travels through the routes/config channel

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_routes, ConfigError};
pub use schema::{ApiConfig, AppConfig, ObservabilityConfig, SyncSettings, API_KEY_ENV};
pub use watcher::RoutesWatcher;
