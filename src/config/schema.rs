//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the syncer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::sync::types::CleanupConfig;

/// Environment variable holding the inventory API key. Takes precedence over
/// the config file so the key can stay out of it.
pub const API_KEY_ENV: &str = "INVENTORY_API_KEY";

/// Root configuration for the syncer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Remote inventory API settings.
    pub api: ApiConfig,

    /// Synchronization behavior.
    pub sync: SyncSettings,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Remote inventory API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// GraphQL endpoint URL (e.g. "https://acme.ztna.example.com/api/graphql/").
    pub endpoint: String,

    /// API key; the INVENTORY_API_KEY environment variable wins when set.
    pub api_key: Option<String>,

    /// Page size for paginated listings.
    pub page_size: u32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            page_size: 100,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// API key resolution: environment first, config file second.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone())
    }
}

/// Synchronization behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Name of the remote network holding managed resources.
    pub remote_network: String,

    /// Proxy-facing IPv4 address resources point at. Auto-detected from the
    /// outbound interface when absent.
    pub proxy_address: Option<String>,

    /// Stale resource cleanup policy.
    pub cleanup: CleanupConfig,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            remote_network: "proxy-managed".to_string(),
            proxy_address: None,
            cleanup: CleanupConfig::default(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
