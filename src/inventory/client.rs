//! GraphQL inventory client.
//!
//! # Responsibilities
//! - Speak the inventory's GraphQL API over HTTPS
//! - Exhaust cursor pagination on every listing
//! - Map the `{ok, error, entity}` mutation envelope onto typed results
//!
//! # Design Decisions
//! - Listings loop `(first, after)` until `hasNextPage` is false; a fixed
//!   single-page fetch silently truncates at scale and is forbidden
//! - The resources query is not scoped server-side; results are filtered to
//!   the target network client-side
//! - A server-reported `ok: false` is a distinct error variant from transport
//!   failure so logs can tell them apart

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::config::schema::ApiConfig;
use crate::inventory::api::RemoteInventory;
use crate::inventory::types::{
    InventoryError, InventoryResult, RemoteNetwork, RemoteResource, ResourceCreate,
    ResourceUpdate,
};

const NETWORKS_QUERY: &str = "query Networks($first: Int!, $after: String) { \
     remoteNetworks(first: $first, after: $after) { \
     pageInfo { hasNextPage endCursor } edges { node { id name } } } }";

const RESOURCES_QUERY: &str = "query Resources($first: Int!, $after: String) { \
     resources(first: $first, after: $after) { \
     pageInfo { hasNextPage endCursor } \
     edges { node { id name address { value } alias remoteNetwork { id } } } } }";

const NETWORK_CREATE_MUTATION: &str = "mutation NetworkCreate($name: String!) { \
     remoteNetworkCreate(name: $name) { ok error entity { id name } } }";

const RESOURCE_CREATE_MUTATION: &str =
    "mutation ResourceCreate($name: String!, $address: String!, $remoteNetworkId: ID!, $alias: String) { \
     resourceCreate(name: $name, address: $address, remoteNetworkId: $remoteNetworkId, alias: $alias) { \
     ok error entity { id name address { value } alias remoteNetwork { id } } } }";

const RESOURCE_UPDATE_MUTATION: &str =
    "mutation ResourceUpdate($id: ID!, $name: String, $address: String, $alias: String) { \
     resourceUpdate(id: $id, name: $name, address: $address, alias: $alias) { \
     ok error entity { id name address { value } alias remoteNetwork { id } } } }";

const RESOURCE_DELETE_MUTATION: &str = "mutation ResourceDelete($id: ID!) { \
     resourceDelete(id: $id) { ok error } }";

/// Production `RemoteInventory` implementation over GraphQL/HTTPS.
pub struct GraphqlInventory {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    page_size: u32,
}

impl GraphqlInventory {
    pub fn new(config: &ApiConfig, api_key: String) -> InventoryResult<Self> {
        let endpoint: Url = config
            .endpoint
            .parse()
            .map_err(|e| InventoryError::Endpoint(format!("'{}': {}", config.endpoint, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            api_key,
            page_size: config.page_size,
        })
    }

    /// Connection test: fetch a single-item networks page and discard it.
    /// Used at startup to fail fast on a bad endpoint or credentials.
    pub async fn probe(&self) -> InventoryResult<()> {
        self.execute(NETWORKS_QUERY, json!({"first": 1, "after": null}))
            .await?;
        tracing::debug!("Inventory API connection test successful");
        Ok(())
    }

    async fn execute(&self, query: &str, variables: Value) -> InventoryResult<Value> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header("X-API-KEY", &self.api_key)
            .json(&json!({"query": query, "variables": variables}))
            .send()
            .await?
            .error_for_status()?;

        let envelope: GraphqlResponse = response.json().await?;

        if let Some(errors) = envelope.errors {
            if !errors.is_empty() {
                let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
                return Err(InventoryError::Api(messages.join("; ")));
            }
        }

        envelope
            .data
            .ok_or_else(|| InventoryError::Decode("response contained no data".into()))
    }

    /// Fetch every page of a relay-style connection under `root`.
    async fn collect_pages<T: DeserializeOwned>(
        &self,
        query: &str,
        root: &str,
    ) -> InventoryResult<Vec<T>> {
        let mut nodes = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let data = self
                .execute(query, json!({"first": self.page_size, "after": cursor}))
                .await?;
            let connection: Connection<T> = decode_field(&data, root)?;

            nodes.extend(connection.edges.into_iter().map(|edge| edge.node));

            if !connection.page_info.has_next_page {
                break;
            }
            match connection.page_info.end_cursor {
                Some(end) => cursor = Some(end),
                // hasNextPage without a cursor would loop forever on page one
                None => break,
            }
        }

        Ok(nodes)
    }

    async fn mutate<T: DeserializeOwned>(
        &self,
        mutation: &str,
        root: &str,
        variables: Value,
    ) -> InventoryResult<MutationEnvelope<T>> {
        let data = self.execute(mutation, variables).await?;
        decode_field(&data, root)
    }
}

#[async_trait]
impl RemoteInventory for GraphqlInventory {
    async fn list_networks(&self) -> InventoryResult<Vec<RemoteNetwork>> {
        let networks: Vec<RemoteNetwork> =
            self.collect_pages(NETWORKS_QUERY, "remoteNetworks").await?;
        tracing::debug!(count = networks.len(), "Retrieved remote networks");
        Ok(networks)
    }

    async fn create_network(&self, name: &str) -> InventoryResult<RemoteNetwork> {
        let envelope: MutationEnvelope<RemoteNetwork> = self
            .mutate(NETWORK_CREATE_MUTATION, "remoteNetworkCreate", json!({"name": name}))
            .await?;
        let network = envelope.into_entity()?;

        tracing::info!(name = %network.name, id = %network.id, "Created remote network");
        Ok(network)
    }

    async fn list_resources(&self, network_id: &str) -> InventoryResult<Vec<RemoteResource>> {
        let nodes: Vec<ResourceNode> = self.collect_pages(RESOURCES_QUERY, "resources").await?;

        // The resources query has no network argument; scope client-side.
        let resources: Vec<RemoteResource> = nodes
            .into_iter()
            .map(RemoteResource::from)
            .filter(|r| r.network_id == network_id)
            .collect();

        tracing::debug!(
            count = resources.len(),
            network_id = %network_id,
            "Retrieved resources"
        );
        Ok(resources)
    }

    async fn create_resource(&self, input: ResourceCreate) -> InventoryResult<RemoteResource> {
        let variables = json!({
            "name": input.name,
            "address": input.address,
            "remoteNetworkId": input.network_id,
            "alias": input.alias,
        });

        let envelope: MutationEnvelope<ResourceNode> = self
            .mutate(RESOURCE_CREATE_MUTATION, "resourceCreate", variables)
            .await?;
        let resource = RemoteResource::from(envelope.into_entity()?);

        tracing::info!(
            name = %resource.name,
            id = %resource.id,
            address = %resource.address,
            "Created resource"
        );
        Ok(resource)
    }

    async fn update_resource(&self, input: ResourceUpdate) -> InventoryResult<RemoteResource> {
        // The mutation signature requires every parameter.
        let variables = json!({
            "id": input.id,
            "name": input.name.unwrap_or_default(),
            "address": input.address.unwrap_or_default(),
            "alias": input.alias.unwrap_or_default(),
        });

        let envelope: MutationEnvelope<ResourceNode> = self
            .mutate(RESOURCE_UPDATE_MUTATION, "resourceUpdate", variables)
            .await?;
        let resource = RemoteResource::from(envelope.into_entity()?);

        tracing::info!(
            name = %resource.name,
            id = %resource.id,
            address = %resource.address,
            "Updated resource"
        );
        Ok(resource)
    }

    async fn delete_resource(&self, id: &str) -> InventoryResult<()> {
        let envelope: MutationEnvelope<Value> = self
            .mutate(RESOURCE_DELETE_MUTATION, "resourceDelete", json!({"id": id}))
            .await?;
        envelope.check()?;

        tracing::debug!(id = %id, "Deleted resource");
        Ok(())
    }
}

fn decode_field<T: DeserializeOwned>(data: &Value, name: &str) -> InventoryResult<T> {
    let field = data
        .get(name)
        .cloned()
        .ok_or_else(|| InventoryError::Decode(format!("missing field '{}'", name)))?;
    serde_json::from_value(field).map_err(|e| InventoryError::Decode(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
    edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
    #[serde(default, rename = "endCursor")]
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Debug, Deserialize)]
struct MutationEnvelope<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    // `Option` fields are already treated as `None` when the key is absent;
    // an explicit `#[serde(default)]` here would add a spurious `T: Default`
    // bound to the derived impl.
    entity: Option<T>,
}

impl<T> MutationEnvelope<T> {
    /// Surface `ok: false` as a rejection; return whatever entity came back.
    fn check(self) -> InventoryResult<Option<T>> {
        if !self.ok {
            return Err(InventoryError::Rejected(
                self.error.unwrap_or_else(|| "unknown error".into()),
            ));
        }
        Ok(self.entity)
    }

    fn into_entity(self) -> InventoryResult<T> {
        self.check()?.ok_or(InventoryError::MissingEntity)
    }
}

/// Resource as it appears on the wire.
#[derive(Debug, Deserialize)]
struct ResourceNode {
    id: String,
    name: String,
    address: AddressNode,
    #[serde(default)]
    alias: Option<String>,
    #[serde(rename = "remoteNetwork")]
    remote_network: NetworkRef,
}

#[derive(Debug, Deserialize)]
struct AddressNode {
    value: String,
}

#[derive(Debug, Deserialize)]
struct NetworkRef {
    id: String,
}

impl From<ResourceNode> for RemoteResource {
    fn from(node: ResourceNode) -> Self {
        RemoteResource {
            id: node.id,
            name: node.name,
            address: node.address.value,
            alias: node.alias,
            network_id: node.remote_network.id,
        }
    }
}
