//! Synchronization subsystem.
//!
//! # Data Flow
//! ```text
//! Routing tree + settings
//!     → discovery (desired ResourceMapping set)
//!     → engine.rs (resolve network → upsert pass → optional cleanup)
//!     → remote inventory converges
//!     → Result / SyncSummary back to the caller
//! ```
//!
//! # Design Decisions
//! - `reconcile` is a pure entry point: any host (CLI, watch loop, tests)
//!   invokes it and receives an explicit result
//! - Callers must not run two syncs against the same network concurrently;
//!   the list-then-mutate pattern is not transactional

use std::sync::Arc;

pub mod engine;
pub mod types;

pub use engine::{NetworkAction, ResourceSyncer, SyncError, SyncSummary};
pub use types::{CleanupConfig, MappingError, ResourceMapping};

use crate::inventory::RemoteInventory;
use crate::routing::{HttpConfig, RouteDiscoverer};

/// Discover desired mappings from the routing tree and converge the remote
/// inventory on them. One invocation, one result.
pub async fn reconcile(
    tree: &HttpConfig,
    proxy_address: &str,
    network_name: &str,
    cleanup: &CleanupConfig,
    inventory: Arc<dyn RemoteInventory>,
) -> Result<(), SyncError> {
    let mappings = RouteDiscoverer::new(proxy_address).discover(tree);

    if mappings.is_empty() {
        tracing::info!("No reverse-proxy endpoints found, skipping sync");
        return Ok(());
    }

    tracing::info!(count = mappings.len(), "Discovered reverse-proxy endpoints");

    ResourceSyncer::new(inventory)
        .sync(&mappings, network_name, cleanup)
        .await
}
