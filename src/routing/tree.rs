//! Routing configuration tree.
//!
//! # Responsibilities
//! - Model the proxy's exported route tree (servers → routes → matchers → handlers)
//! - Resolve handler kinds at decode time into a closed enum
//! - Accept both pre-built handler values and untyped key-tagged JSON maps
//!
//! # Design Decisions
//! - Servers live in a BTreeMap so traversal order is deterministic
//! - Handler is a closed variant {ProxyLeaf, Subroute, Opaque}; unknown handler
//!   kinds decode to Opaque rather than failing the whole tree
//! - Matcher fields are optional: absence means "inherit from parent"

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The proxy's HTTP app configuration: a set of named servers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfig {
    #[serde(default)]
    pub servers: BTreeMap<String, Server>,
}

/// A single listener with an ordered route list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Server {
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// One routing step: matcher sets gate the handlers below them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Route {
    #[serde(default, rename = "match")]
    pub matchers: Vec<MatcherSet>,

    #[serde(default, rename = "handle")]
    pub handlers: Vec<Handler>,
}

/// Matcher conditions on a route. Fields left out inherit from the parent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatcherSet {
    /// Host names this route applies to. Replaces the inherited host list.
    #[serde(default)]
    pub host: Option<Vec<String>>,

    /// Path patterns; only the first pattern is significant.
    #[serde(default)]
    pub path: Option<Vec<String>>,
}

/// A route handler, reduced to the three kinds discovery cares about.
#[derive(Debug, Clone)]
pub enum Handler {
    /// Terminal reverse-proxy handler; emits an endpoint per current host.
    ProxyLeaf,
    /// Nested route list; traversal recurses with the current context.
    Subroute(Vec<Route>),
    /// Anything else (static responses, rewrites, ...). Skipped.
    Opaque,
}

impl Handler {
    /// Classify an untyped key-tagged handler map.
    ///
    /// Missing or non-string `handler` tags classify as Opaque, as do
    /// subroutes whose inner route list fails to decode.
    pub fn from_value(value: &Value) -> Handler {
        let Some(tag) = value.get("handler").and_then(Value::as_str) else {
            return Handler::Opaque;
        };

        match tag {
            "reverse_proxy" => Handler::ProxyLeaf,
            "subroute" => {
                let routes = match value.get("routes") {
                    Some(raw) => match serde_json::from_value(raw.clone()) {
                        Ok(routes) => routes,
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to decode subroute routes, skipping");
                            return Handler::Opaque;
                        }
                    },
                    None => Vec::new(),
                };
                Handler::Subroute(routes)
            }
            _ => Handler::Opaque,
        }
    }
}

impl<'de> Deserialize<'de> for Handler {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Handler::from_value(&value))
    }
}
