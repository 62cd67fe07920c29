//! Reconciliation engine.
//!
//! # Responsibilities
//! - Resolve (or create) the target network
//! - Upsert each desired mapping with a minimal diff
//! - Optionally delete stale resources, honoring dry-run
//! - Aggregate per-item failures into one result
//!
//! # Design Decisions
//! - Network resolution failure is fatal; everything else is counted and the
//!   batch continues
//! - Each mapping's upsert fetches its own resource listing, so one listing
//!   failure isolates to that mapping
//! - An update is only issued when at least one of name/address/alias differs;
//!   repeated syncs against unchanged state make zero mutation calls
//! - The engine holds no cross-invocation state; results are returned, never
//!   stored

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::inventory::types::{
    InventoryError, InventoryResult, RemoteNetwork, RemoteResource, ResourceCreate,
    ResourceUpdate,
};
use crate::inventory::RemoteInventory;
use crate::sync::types::{CleanupConfig, MappingError, ResourceMapping};

/// Errors reported by a sync invocation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The target network could not be resolved or created. Nothing else can
    /// proceed without it, so the whole sync aborts.
    #[error("failed to resolve remote network: {0}")]
    NetworkResolution(#[source] InventoryError),

    /// The batch ran to completion but some items failed.
    #[error("sync completed with errors (upsert: {upsert_errors}, cleanup: {cleanup_errors})")]
    Partial {
        upsert_errors: usize,
        cleanup_errors: usize,
    },
}

/// Per-mapping upsert failure: either local validation or a remote call.
#[derive(Debug, Error)]
enum UpsertError {
    #[error("invalid mapping: {0}")]
    Invalid(#[from] MappingError),

    #[error(transparent)]
    Remote(#[from] InventoryError),
}

/// What a sync would do to the target network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkAction {
    Create,
    UseExisting,
}

/// Read-only preview of a sync cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSummary {
    pub total_mappings: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_action: Option<NetworkAction>,
    pub network_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    pub resources_to_create: usize,
    pub resources_to_update: usize,
}

/// Drives the remote inventory to converge on the desired mapping set.
pub struct ResourceSyncer {
    inventory: Arc<dyn RemoteInventory>,
}

impl ResourceSyncer {
    pub fn new(inventory: Arc<dyn RemoteInventory>) -> Self {
        Self { inventory }
    }

    /// Run one reconciliation batch. Idempotent and safe to re-invoke;
    /// returns `Err` iff any per-item operation failed.
    pub async fn sync(
        &self,
        mappings: &[ResourceMapping],
        network_name: &str,
        cleanup: &CleanupConfig,
    ) -> Result<(), SyncError> {
        if mappings.is_empty() {
            tracing::info!("No resource mappings to sync");
            return Ok(());
        }

        tracing::info!(
            remote_network = %network_name,
            mappings = mappings.len(),
            "Starting resource synchronization"
        );

        let network = self
            .resolve_network(network_name)
            .await
            .map_err(SyncError::NetworkResolution)?;

        tracing::info!(name = %network.name, id = %network.id, "Using remote network");

        let (success, upsert_errors) = self.upsert_all(mappings, &network.id).await;
        tracing::info!(success, errors = upsert_errors, "Resource upsert completed");

        let cleanup_errors = if cleanup.enabled {
            let (deleted, errors) = self.delete_stale(mappings, &network.id, cleanup).await;
            tracing::info!(deleted, errors, dry_run = cleanup.dry_run, "Resource cleanup completed");
            errors
        } else {
            tracing::debug!("Resource cleanup disabled, skipping deletion phase");
            0
        };

        if upsert_errors + cleanup_errors > 0 {
            return Err(SyncError::Partial {
                upsert_errors,
                cleanup_errors,
            });
        }

        Ok(())
    }

    /// Classify each mapping as to-create or to-update without mutating
    /// anything. Cleanup is not previewed.
    pub async fn summary(
        &self,
        mappings: &[ResourceMapping],
        network_name: &str,
    ) -> Result<SyncSummary, SyncError> {
        let mut summary = SyncSummary {
            total_mappings: mappings.len(),
            ..SyncSummary::default()
        };

        if mappings.is_empty() {
            return Ok(summary);
        }

        let networks = self
            .inventory
            .list_networks()
            .await
            .map_err(SyncError::NetworkResolution)?;
        let network = networks.into_iter().find(|n| n.name == network_name);

        match &network {
            Some(network) => {
                summary.network_action = Some(NetworkAction::UseExisting);
                summary.network_name = network.name.clone();
                summary.network_id = Some(network.id.clone());
            }
            None => {
                summary.network_action = Some(NetworkAction::Create);
                summary.network_name = network_name.to_string();
            }
        }

        for mapping in mappings {
            let Some(network) = &network else {
                summary.resources_to_create += 1;
                continue;
            };

            match self.find_existing(mapping, &network.id).await {
                Ok(Some(_)) => summary.resources_to_update += 1,
                Ok(None) => summary.resources_to_create += 1,
                Err(e) => {
                    tracing::warn!(
                        name = %mapping.name,
                        error = %e,
                        "Failed to check existing resource during summary"
                    );
                }
            }
        }

        Ok(summary)
    }

    /// Find the target network by exact name, creating it if absent.
    async fn resolve_network(&self, name: &str) -> InventoryResult<RemoteNetwork> {
        let networks = self.inventory.list_networks().await?;

        if let Some(network) = networks.into_iter().find(|n| n.name == name) {
            tracing::debug!(name = %name, id = %network.id, "Found remote network by name");
            return Ok(network);
        }

        self.inventory.create_network(name).await
    }

    async fn upsert_all(&self, mappings: &[ResourceMapping], network_id: &str) -> (usize, usize) {
        let (mut success, mut errors) = (0, 0);

        for (i, mapping) in mappings.iter().enumerate() {
            tracing::debug!(
                index = i + 1,
                total = mappings.len(),
                name = %mapping.name,
                "Upserting resource"
            );

            match self.upsert_one(mapping, network_id).await {
                Ok(()) => success += 1,
                Err(e) => {
                    tracing::error!(name = %mapping.name, error = %e, "Failed to upsert resource");
                    errors += 1;
                }
            }
        }

        (success, errors)
    }

    async fn upsert_one(
        &self,
        mapping: &ResourceMapping,
        network_id: &str,
    ) -> Result<(), UpsertError> {
        mapping.validate()?;

        let existing = self.find_existing(mapping, network_id).await?;

        match existing {
            Some(existing) => match build_update(&existing, mapping) {
                Some(update) => {
                    self.inventory.update_resource(update).await?;
                    Ok(())
                }
                None => {
                    tracing::debug!(
                        id = %existing.id,
                        name = %existing.name,
                        "Resource is already up to date"
                    );
                    Ok(())
                }
            },
            None => {
                self.inventory
                    .create_resource(ResourceCreate {
                        name: mapping.name.clone(),
                        address: mapping.address.clone(),
                        network_id: network_id.to_string(),
                        alias: mapping.alias.clone(),
                    })
                    .await?;
                Ok(())
            }
        }
    }

    /// Look up a resource by alias when the mapping has one, by exact name
    /// otherwise.
    async fn find_existing(
        &self,
        mapping: &ResourceMapping,
        network_id: &str,
    ) -> InventoryResult<Option<RemoteResource>> {
        let resources = self.inventory.list_resources(network_id).await?;

        let found = match &mapping.alias {
            Some(alias) => resources
                .into_iter()
                .find(|r| r.alias.as_deref() == Some(alias.as_str())),
            None => resources.into_iter().find(|r| r.name == mapping.name),
        };

        Ok(found)
    }

    /// Delete every resource in the network whose name is not desired.
    /// Returns (deleted, errors); in dry-run mode "deleted" counts would-be
    /// deletions.
    async fn delete_stale(
        &self,
        desired: &[ResourceMapping],
        network_id: &str,
        cleanup: &CleanupConfig,
    ) -> (usize, usize) {
        let existing = match self.inventory.list_resources(network_id).await {
            Ok(resources) => resources,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list resources in network");
                return (0, 1);
            }
        };

        tracing::info!(count = existing.len(), "Found existing resources in network");

        let desired_names: HashSet<&str> = desired.iter().map(|m| m.name.as_str()).collect();
        let stale: Vec<RemoteResource> = existing
            .into_iter()
            .filter(|r| !desired_names.contains(r.name.as_str()))
            .collect();

        if stale.is_empty() {
            tracing::info!("No stale resources to delete");
            return (0, 0);
        }

        tracing::info!(count = stale.len(), dry_run = cleanup.dry_run, "Found stale resources");

        let (mut deleted, mut errors) = (0, 0);
        for resource in stale {
            if cleanup.dry_run {
                tracing::info!(
                    id = %resource.id,
                    name = %resource.name,
                    address = %resource.address,
                    "[DRY RUN] Would delete resource"
                );
                deleted += 1;
                continue;
            }

            tracing::info!(id = %resource.id, name = %resource.name, "Deleting stale resource");

            match self.inventory.delete_resource(&resource.id).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    tracing::error!(
                        id = %resource.id,
                        name = %resource.name,
                        error = %e,
                        "Failed to delete resource"
                    );
                    errors += 1;
                }
            }
        }

        (deleted, errors)
    }
}

/// Compute the minimal update for an existing resource, starting from its
/// current values and overriding only what differs. `None` means nothing
/// changed and no call should be made.
fn build_update(existing: &RemoteResource, desired: &ResourceMapping) -> Option<ResourceUpdate> {
    let mut update = ResourceUpdate {
        id: existing.id.clone(),
        name: Some(existing.name.clone()),
        address: Some(existing.address.clone()),
        alias: existing.alias.clone(),
    };
    let mut changed = false;

    if existing.name != desired.name {
        update.name = Some(desired.name.clone());
        changed = true;
    }

    if existing.address != desired.address {
        update.address = Some(desired.address.clone());
        changed = true;
    }

    if existing.alias != desired.alias {
        update.alias = desired.alias.clone();
        changed = true;
    }

    changed.then_some(update)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing() -> RemoteResource {
        RemoteResource {
            id: "res-1".into(),
            name: "api.example.com".into(),
            address: "10.0.0.1".into(),
            alias: Some("api.example.com".into()),
            network_id: "net-1".into(),
        }
    }

    fn desired() -> ResourceMapping {
        ResourceMapping {
            name: "api.example.com".into(),
            alias: Some("api.example.com".into()),
            address: "10.0.0.1".into(),
        }
    }

    #[test]
    fn test_no_update_when_unchanged() {
        assert!(build_update(&existing(), &desired()).is_none());
    }

    #[test]
    fn test_update_carries_unchanged_fields() {
        let mut mapping = desired();
        mapping.address = "10.0.0.2".into();

        let update = build_update(&existing(), &mapping).expect("address changed");
        assert_eq!(update.id, "res-1");
        assert_eq!(update.name.as_deref(), Some("api.example.com"));
        assert_eq!(update.address.as_deref(), Some("10.0.0.2"));
        assert_eq!(update.alias.as_deref(), Some("api.example.com"));
    }

    #[test]
    fn test_alias_removal_is_a_change() {
        let mut mapping = desired();
        mapping.alias = None;

        let update = build_update(&existing(), &mapping).expect("alias changed");
        assert_eq!(update.alias, None);
        assert_eq!(update.address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_summary_serializes_snake_case_action() {
        let summary = SyncSummary {
            total_mappings: 2,
            network_action: Some(NetworkAction::UseExisting),
            network_name: "proxy-managed".into(),
            network_id: Some("net-1".into()),
            resources_to_create: 1,
            resources_to_update: 1,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["network_action"], "use_existing");
        assert_eq!(json["resources_to_create"], 1);
    }
}
