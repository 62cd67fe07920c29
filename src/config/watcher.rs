//! Routes file watcher for re-sync triggering.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_routes;
use crate::routing::HttpConfig;

/// Watches the proxy's routes export and emits freshly parsed trees.
///
/// A change that fails to parse is logged and dropped; the previous desired
/// state stays in effect until the next good write.
pub struct RoutesWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<HttpConfig>,
}

impl RoutesWatcher {
    /// Create a new RoutesWatcher.
    ///
    /// Returns the watcher and a receiver for re-parsed routing trees.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<HttpConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Routes file change detected, re-reading...");
                        match load_routes(&path) {
                            Ok(tree) => {
                                let _ = tx.send(tree);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to re-read routes: {}. Keeping current desired state.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Routes watcher started");
        Ok(watcher)
    }
}
