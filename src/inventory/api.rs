//! Remote inventory contract.
//!
//! # Responsibilities
//! - Define the operations the reconciliation engine needs
//! - Keep the engine independent of the wire protocol
//!
//! # Design Decisions
//! - Listing methods return complete sets: implementations must exhaust
//!   pagination, never a fixed first page
//! - Object-safe so the engine can hold `Arc<dyn RemoteInventory>` and tests
//!   can substitute an in-memory implementation

use async_trait::async_trait;

use crate::inventory::types::{
    InventoryResult, RemoteNetwork, RemoteResource, ResourceCreate, ResourceUpdate,
};

#[async_trait]
pub trait RemoteInventory: Send + Sync {
    /// List every remote network.
    async fn list_networks(&self) -> InventoryResult<Vec<RemoteNetwork>>;

    /// Create a network with the given name.
    async fn create_network(&self, name: &str) -> InventoryResult<RemoteNetwork>;

    /// List every resource in one network.
    async fn list_resources(&self, network_id: &str) -> InventoryResult<Vec<RemoteResource>>;

    /// Create a resource; the returned value carries the assigned ID.
    async fn create_resource(&self, input: ResourceCreate) -> InventoryResult<RemoteResource>;

    /// Update an existing resource.
    async fn update_resource(&self, input: ResourceUpdate) -> InventoryResult<RemoteResource>;

    /// Delete a resource by ID.
    async fn delete_resource(&self, id: &str) -> InventoryResult<()>;
}
