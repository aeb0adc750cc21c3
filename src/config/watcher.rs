//! Configuration file watcher for hot reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::{load_config_with, Overrides};
use crate::config::schema::GradebookConfig;

/// Watches the configuration file and forwards every valid new version.
pub struct ConfigWatcher {
    path: PathBuf,
    overrides: Overrides,
    update_tx: mpsc::UnboundedSender<GradebookConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for reloaded configurations.
    /// `overrides` are applied to every reloaded file.
    pub fn new(
        path: &Path,
        overrides: Overrides,
    ) -> (Self, mpsc::UnboundedReceiver<GradebookConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            overrides,
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. The returned handle must be kept alive for as long as
    /// reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            overrides,
            update_tx,
        } = self;
        let reload_path = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    match load_config_with(Some(&reload_path), &overrides) {
                        Ok(config) => {
                            tracing::info!(path = ?reload_path, "Configuration file reloaded");
                            let _ = update_tx.send(config);
                        }
                        Err(e) => {
                            tracing::error!(
                                error = %e,
                                "Rejected reloaded configuration, keeping current one"
                            );
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}
