//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Routes file (proxy JSON export)
//!     → tree.rs (decode servers/routes/matchers, classify handlers)
//!     → discover.rs (traverse with inherited context, emit endpoints)
//!     → consolidate by host
//!     → Vec<ResourceMapping> (desired state)
//! ```
//!
//! # Design Decisions
//! - Handler kinds are resolved once at decode time (closed enum), so the
//!   traversal has a single dispatch path
//! - Discovery is a pure function of the tree: deterministic, no remote calls
//! - Paths are tracked for deduplication only; the inventory is host-level

pub mod discover;
pub mod tree;

pub use discover::{normalize_path, Endpoint, RouteContext, RouteDiscoverer};
pub use tree::{Handler, HttpConfig, MatcherSet, Route, Server};
