//! Inventory entity types and error definitions.

use serde::Deserialize;
use thiserror::Error;

/// A remote network grouping resources. One network is the reconciliation
/// target per sync cycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteNetwork {
    pub id: String,
    pub name: String,
}

/// A host-level access resource as the inventory stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResource {
    pub id: String,
    pub name: String,
    pub address: String,
    pub alias: Option<String>,
    pub network_id: String,
}

/// Input for creating a resource. The inventory assigns the ID.
#[derive(Debug, Clone)]
pub struct ResourceCreate {
    pub name: String,
    pub address: String,
    pub network_id: String,
    pub alias: Option<String>,
}

/// Input for updating a resource. Fields left `None` fall back to the
/// remote's current value; the engine always sends all three.
#[derive(Debug, Clone)]
pub struct ResourceUpdate {
    pub id: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub alias: Option<String>,
}

/// Errors from talking to the remote inventory.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Endpoint URL could not be parsed.
    #[error("invalid inventory endpoint: {0}")]
    Endpoint(String),

    /// Network-level failure reaching the API (connect, timeout, TLS, HTTP status).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a top-level errors array.
    #[error("api error: {0}")]
    Api(String),

    /// A mutation went through but the server reported `ok: false`.
    #[error("rejected by remote: {0}")]
    Rejected(String),

    /// Response arrived but did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(String),

    /// A mutation reported success but returned no entity.
    #[error("mutation succeeded but returned no entity")]
    MissingEntity,
}

/// Result type for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;
