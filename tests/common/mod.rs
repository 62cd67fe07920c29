//! Shared utilities for integration testing.

// Each integration binary uses a subset of these helpers.
#![allow(dead_code)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use access_sync::inventory::{
    InventoryError, InventoryResult, RemoteInventory, RemoteNetwork, RemoteResource,
    ResourceCreate, ResourceUpdate,
};

/// In-memory inventory with a call log and failure injection.
#[derive(Default)]
pub struct MockInventory {
    pub state: Mutex<MockState>,
}

#[derive(Default)]
pub struct MockState {
    pub networks: Vec<RemoteNetwork>,
    pub resources: Vec<RemoteResource>,
    pub calls: Vec<String>,
    pub fail_list_networks: bool,
    pub fail_list_resources: bool,
    pub fail_delete_ids: HashSet<String>,
    next_id: u32,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

impl MockInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_network(&self, id: &str, name: &str) {
        self.state.lock().unwrap().networks.push(RemoteNetwork {
            id: id.into(),
            name: name.into(),
        });
    }

    pub fn seed_resource(
        &self,
        id: &str,
        name: &str,
        address: &str,
        alias: Option<&str>,
        network_id: &str,
    ) {
        self.state.lock().unwrap().resources.push(RemoteResource {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            alias: alias.map(String::from),
            network_id: network_id.into(),
        });
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Count of calls that would mutate remote state.
    pub fn mutation_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| {
                call.starts_with("create_network")
                    || call.starts_with("create_resource")
                    || call.starts_with("update_resource")
                    || call.starts_with("delete_resource")
            })
            .count()
    }

    pub fn resources(&self) -> Vec<RemoteResource> {
        self.state.lock().unwrap().resources.clone()
    }

    pub fn resource_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .resources()
            .into_iter()
            .map(|resource| resource.name)
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl RemoteInventory for MockInventory {
    async fn list_networks(&self) -> InventoryResult<Vec<RemoteNetwork>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("list_networks".into());

        if state.fail_list_networks {
            return Err(InventoryError::Api("injected listing failure".into()));
        }
        Ok(state.networks.clone())
    }

    async fn create_network(&self, name: &str) -> InventoryResult<RemoteNetwork> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create_network({})", name));

        let network = RemoteNetwork {
            id: state.next_id("net"),
            name: name.into(),
        };
        state.networks.push(network.clone());
        Ok(network)
    }

    async fn list_resources(&self, network_id: &str) -> InventoryResult<Vec<RemoteResource>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("list_resources({})", network_id));

        if state.fail_list_resources {
            return Err(InventoryError::Api("injected listing failure".into()));
        }
        Ok(state
            .resources
            .iter()
            .filter(|r| r.network_id == network_id)
            .cloned()
            .collect())
    }

    async fn create_resource(&self, input: ResourceCreate) -> InventoryResult<RemoteResource> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create_resource({})", input.name));

        let resource = RemoteResource {
            id: state.next_id("res"),
            name: input.name,
            address: input.address,
            alias: input.alias,
            network_id: input.network_id,
        };
        state.resources.push(resource.clone());
        Ok(resource)
    }

    async fn update_resource(&self, input: ResourceUpdate) -> InventoryResult<RemoteResource> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("update_resource({})", input.id));

        let resource = state
            .resources
            .iter_mut()
            .find(|r| r.id == input.id)
            .ok_or_else(|| InventoryError::Rejected(format!("no resource '{}'", input.id)))?;

        if let Some(name) = input.name {
            resource.name = name;
        }
        if let Some(address) = input.address {
            resource.address = address;
        }
        resource.alias = input.alias;

        Ok(resource.clone())
    }

    async fn delete_resource(&self, id: &str) -> InventoryResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete_resource({})", id));

        if state.fail_delete_ids.contains(id) {
            return Err(InventoryError::Rejected("injected delete failure".into()));
        }

        state.resources.retain(|r| r.id != id);
        Ok(())
    }
}

/// Start a hand-rolled HTTP backend that feeds each request body to `handler`
/// and writes back the (status, JSON body) it returns.
pub async fn start_graphql_backend<F>(handler: F) -> SocketAddr
where
    F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let handler = handler.clone();

            tokio::spawn(async move {
                let Some(body) = read_request_body(&mut socket).await else {
                    return;
                };

                let (status, response_body) = handler(&body);
                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    response_body.len(),
                    response_body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

async fn read_request_body(socket: &mut tokio::net::TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
                    break pos + 4;
                }
            }
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    Some(String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string())
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
