//! Reverse-Proxy Route → Access Inventory Synchronizer

pub mod config;
pub mod inventory;
pub mod net;
pub mod routing;
pub mod sync;

pub use config::AppConfig;
pub use inventory::{GraphqlInventory, RemoteInventory};
pub use routing::RouteDiscoverer;
pub use sync::{reconcile, ResourceSyncer};
