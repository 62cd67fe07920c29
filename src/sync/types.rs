//! Desired-state types and mapping validation.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The unit of desired state: one mapping per distinct host after
/// consolidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMapping {
    pub name: String,
    pub alias: Option<String>,
    pub address: String,
}

impl ResourceMapping {
    /// Check the invariants the remote inventory enforces. Runs before any
    /// remote call so malformed mappings never leave the process.
    pub fn validate(&self) -> Result<(), MappingError> {
        if self.name.is_empty() {
            return Err(MappingError::EmptyName);
        }
        if self.address.is_empty() {
            return Err(MappingError::EmptyAddress);
        }

        match self.address.parse::<IpAddr>() {
            Err(_) => Err(MappingError::NotAnAddress(self.address.clone())),
            // The inventory API only accepts IPv4 resource addresses.
            Ok(IpAddr::V6(_)) => Err(MappingError::Ipv6Unsupported(self.address.clone())),
            Ok(IpAddr::V4(_)) => Ok(()),
        }
    }
}

/// Validation failures for a single mapping.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("resource name cannot be empty")]
    EmptyName,

    #[error("resource address cannot be empty")]
    EmptyAddress,

    #[error("address '{0}' is not a valid IP address")]
    NotAnAddress(String),

    #[error("address '{0}' is IPv6, but only IPv4 is supported")]
    Ipv6Unsupported(String),
}

/// Policy for deleting resources no longer derived from the routing tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Delete stale resources after the upsert pass.
    pub enabled: bool,

    /// Report would-be deletions without mutating anything. Only meaningful
    /// when `enabled` is true.
    pub dry_run: bool,
}
