//! Remote inventory subsystem.
//!
//! # Data Flow
//! ```text
//! Reconciliation engine
//!     → api.rs (RemoteInventory trait: list/create/update/delete)
//!     → client.rs (GraphQL over HTTPS, cursor pagination)
//!     → remote access-control inventory
//! ```
//!
//! # Design Decisions
//! - The engine only sees the trait; the GraphQL client is one implementation
//! - Entities carry IDs only after the inventory assigns them
//! - Mutations distinguish transport failure from server rejection

pub mod api;
pub mod client;
pub mod types;

pub use api::RemoteInventory;
pub use client::GraphqlInventory;
pub use types::{
    InventoryError, InventoryResult, RemoteNetwork, RemoteResource, ResourceCreate,
    ResourceUpdate,
};
