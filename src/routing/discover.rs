//! Route discovery.
//!
//! # Responsibilities
//! - Walk the routing tree carrying inherited host/path context
//! - Emit one endpoint per (host, path) pair behind a proxy leaf
//! - Consolidate endpoints by host into desired resource mappings
//!
//! # Design Decisions
//! - Host matchers replace the inherited host list; path matchers replace the
//!   inherited path (first pattern only)
//! - A named server acts as an implicit host matcher for its routes
//! - No host anywhere along a chain falls back to "localhost" with a warning
//! - Output is sorted by mapping name so discovery is deterministic

use std::collections::BTreeMap;

use crate::routing::tree::{Handler, HttpConfig, Route};
use crate::sync::types::ResourceMapping;

/// Server names the proxy assigns when no explicit name is configured.
/// These carry no host information.
const ANONYMOUS_SERVER_NAMES: &[&str] = &["", "srv0"];

/// Matcher context inherited down the route tree.
#[derive(Debug, Clone, Default)]
pub struct RouteContext {
    pub hosts: Vec<String>,
    pub path: String,
}

/// A discovered (host, path) pair, pre-consolidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub path: String,
}

impl Endpoint {
    /// Key for host+path deduplication across traversal branches.
    pub fn canonical_key(&self) -> String {
        format!("{}\0{}", self.host, self.path)
    }

    /// The inventory models access per host, so the resource name is the
    /// host alone; paths are discarded.
    pub fn resource_name(&self) -> &str {
        &self.host
    }

    /// Wildcard hosts cannot be DNS aliases; everything else aliases to the
    /// host itself.
    pub fn resource_alias(&self) -> Option<String> {
        if self.host.contains('*') {
            return None;
        }
        Some(self.host.clone())
    }

    pub fn to_mapping(&self, address: &str) -> ResourceMapping {
        ResourceMapping {
            name: self.resource_name().to_string(),
            alias: self.resource_alias(),
            address: address.to_string(),
        }
    }
}

/// Normalize a path matcher pattern to a consistent prefix form:
/// `/api/*` → `/api/`, `/api` → `/api/`, `/` → ``.
pub fn normalize_path(path: &str) -> String {
    let mut path = path.strip_suffix('*').unwrap_or(path).to_string();

    if !path.is_empty() && path != "/" && !path.ends_with('/') {
        path.push('/');
    }

    if path == "/" {
        path.clear();
    }

    path
}

/// Walks a routing tree and derives the desired resource mappings.
pub struct RouteDiscoverer {
    proxy_address: String,
}

impl RouteDiscoverer {
    pub fn new(proxy_address: impl Into<String>) -> Self {
        Self {
            proxy_address: proxy_address.into(),
        }
    }

    /// Traverse every server and consolidate discovered endpoints into one
    /// mapping per distinct host, sorted by name.
    pub fn discover(&self, tree: &HttpConfig) -> Vec<ResourceMapping> {
        let mut endpoints: BTreeMap<String, Endpoint> = BTreeMap::new();

        for (server_name, server) in &tree.servers {
            tracing::debug!(server = %server_name, "Scanning server");

            let mut ctx = RouteContext::default();
            if !ANONYMOUS_SERVER_NAMES.contains(&server_name.as_str()) {
                ctx.hosts = vec![server_name.clone()];
            }

            for (i, route) in server.routes.iter().enumerate() {
                tracing::debug!(server = %server_name, route_index = i, "Scanning route");
                self.traverse_route(route, &ctx, &mut endpoints);
            }
        }

        // Consolidate by host: the inventory has no path-level concept.
        let mut by_host: BTreeMap<String, Endpoint> = BTreeMap::new();
        for ep in endpoints.into_values() {
            by_host.entry(ep.host.clone()).or_insert(Endpoint {
                host: ep.host,
                path: String::new(),
            });
        }

        let mappings: Vec<ResourceMapping> = by_host
            .values()
            .map(|ep| ep.to_mapping(&self.proxy_address))
            .collect();

        tracing::info!(count = mappings.len(), "Route discovery complete");

        mappings
    }

    fn traverse_route(
        &self,
        route: &Route,
        parent_ctx: &RouteContext,
        endpoints: &mut BTreeMap<String, Endpoint>,
    ) {
        let ctx = merge_matchers(route, parent_ctx);

        for handler in &route.handlers {
            match handler {
                Handler::ProxyLeaf => self.emit_endpoints(&ctx, endpoints),
                Handler::Subroute(routes) => {
                    for inner in routes {
                        self.traverse_route(inner, &ctx, endpoints);
                    }
                }
                Handler::Opaque => {
                    tracing::debug!("Skipping opaque handler");
                }
            }
        }
    }

    fn emit_endpoints(&self, ctx: &RouteContext, endpoints: &mut BTreeMap<String, Endpoint>) {
        let fallback;
        let hosts = if ctx.hosts.is_empty() {
            tracing::warn!(
                path = %ctx.path,
                "No host matchers found for reverse-proxy route, using localhost"
            );
            fallback = vec!["localhost".to_string()];
            &fallback
        } else {
            &ctx.hosts
        };

        for host in hosts {
            let ep = Endpoint {
                host: host.clone(),
                path: ctx.path.clone(),
            };

            let key = ep.canonical_key();
            if !endpoints.contains_key(&key) {
                tracing::debug!(host = %ep.host, path = %ep.path, "Discovered endpoint");
                endpoints.insert(key, ep);
            }
        }
    }
}

/// Apply a route's matcher sets on top of the inherited context.
fn merge_matchers(route: &Route, parent_ctx: &RouteContext) -> RouteContext {
    let mut ctx = parent_ctx.clone();

    for matcher_set in &route.matchers {
        if let Some(hosts) = &matcher_set.host {
            ctx.hosts = hosts.clone();
        }

        if let Some(paths) = &matcher_set.path {
            // Only the first pattern is significant.
            if let Some(first) = paths.first() {
                ctx.path = normalize_path(first);
            }
        }
    }

    ctx
}
