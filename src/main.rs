//! access-sync (v1)
//!
//! Derives desired network-access resources from a reverse proxy's routing
//! configuration and reconciles them against a remote access-control
//! inventory.
//!
//! # Architecture Overview
//!
//! ```text
//!   routes file (proxy JSON export)          config file (TOML)
//!        │                                        │
//!        ▼                                        ▼
//!   ┌──────────┐    ┌─────────────┐    ┌─────────────────────┐
//!   │ routing  │───▶│    sync     │───▶│      inventory      │
//!   │ discover │    │   engine    │    │  (GraphQL client)   │
//!   └──────────┘    └─────────────┘    └──────────┬──────────┘
//!        ▲                                        │
//!        │ re-read on change (--watch)            ▼
//!   ┌──────────┐                        remote access-control
//!   │ watcher  │                             inventory
//!   └──────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use access_sync::config::{self, AppConfig, RoutesWatcher};
use access_sync::inventory::GraphqlInventory;
use access_sync::net;
use access_sync::routing::RouteDiscoverer;
use access_sync::sync::{reconcile, ResourceSyncer};

#[derive(Parser)]
#[command(name = "access-sync")]
#[command(about = "Sync reverse-proxy routes into a remote access-control inventory", long_about = None)]
struct Cli {
    /// Syncer configuration file (TOML)
    #[arg(short, long, default_value = "access-sync.toml")]
    config: PathBuf,

    /// Proxy routes export (JSON)
    #[arg(short, long, default_value = "routes.json")]
    routes: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the remote inventory against the discovered routes
    Sync {
        /// Keep running and re-sync whenever the routes file changes
        #[arg(long)]
        watch: bool,
    },
    /// Preview creates/updates without mutating the remote inventory
    Plan,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = config::load_config(&cli.config)?;

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.observability.log_level)
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("access-sync v0.1.0 starting");

    let api_key = config.api.resolve_api_key().ok_or_else(|| {
        format!(
            "API key is required: set {} or api.api_key in the config file",
            config::API_KEY_ENV
        )
    })?;

    let inventory = Arc::new(GraphqlInventory::new(&config.api, api_key)?);

    inventory.probe().await?;
    tracing::info!(endpoint = %config.api.endpoint, "Inventory API connection verified");

    let proxy_address = resolve_proxy_address(&config)?;

    if config.sync.cleanup.enabled {
        tracing::warn!(
            dry_run = config.sync.cleanup.dry_run,
            remote_network = %config.sync.remote_network,
            "Resource cleanup ENABLED - every resource in the network not derived from the routing tree will be deleted"
        );
    }

    let tree = config::load_routes(&cli.routes)?;

    match cli.command {
        Commands::Plan => {
            let mappings = RouteDiscoverer::new(&proxy_address).discover(&tree);
            let summary = ResourceSyncer::new(inventory)
                .summary(&mappings, &config.sync.remote_network)
                .await?;

            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Sync { watch } => {
            let result = reconcile(
                &tree,
                &proxy_address,
                &config.sync.remote_network,
                &config.sync.cleanup,
                inventory.clone(),
            )
            .await;

            if !watch {
                result?;
                tracing::info!("Sync completed successfully");
                return Ok(());
            }

            match result {
                Ok(()) => tracing::info!("Sync completed successfully"),
                Err(e) => tracing::error!(error = %e, "Initial sync failed; watching for changes"),
            }

            let (watcher, mut updates) = RoutesWatcher::new(&cli.routes);
            let _watcher = watcher.run()?;

            loop {
                tokio::select! {
                    maybe_tree = updates.recv() => {
                        let Some(tree) = maybe_tree else { break };
                        let result = reconcile(
                            &tree,
                            &proxy_address,
                            &config.sync.remote_network,
                            &config.sync.cleanup,
                            inventory.clone(),
                        )
                        .await;

                        match result {
                            Ok(()) => tracing::info!("Re-sync completed successfully"),
                            Err(e) => tracing::error!(error = %e, "Re-sync failed; keeping watch"),
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutdown signal received");
                        break;
                    }
                }
            }

            tracing::info!("Shutdown complete");
        }
    }

    Ok(())
}

fn resolve_proxy_address(config: &AppConfig) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(address) = &config.sync.proxy_address {
        tracing::info!(address = %address, "Using explicitly configured proxy address");
        return Ok(address.clone());
    }

    let address = net::outbound_address().map_err(|e| {
        format!(
            "failed to auto-detect proxy address: {}. Consider setting sync.proxy_address explicitly",
            e
        )
    })?;

    tracing::info!(
        address = %address,
        method = "udp_probe",
        "Auto-detected proxy address from outbound interface"
    );

    Ok(address)
}
