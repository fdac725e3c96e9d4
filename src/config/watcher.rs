//! Configuration file watcher for hot reload.
//!
//! Editors and Kubernetes ConfigMaps save by writing a sibling file and
//! renaming it over the original, which replaces the inode. The watch is
//! therefore placed on the parent directory and events are matched by file
//! name, so every save is seen no matter how it was written.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::ServiceConfig;

/// Watches one config file and sends every successfully reloaded config.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ServiceConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for reloaded configurations.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ServiceConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (Self { path: path.to_path_buf(), update_tx }, update_rx)
    }

    /// Start watching. The returned handle must be kept alive for events to
    /// keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let file_name = self.path.file_name().map(OsString::from).ok_or_else(|| {
            notify::Error::generic("config path has no file name").add_path(self.path.clone())
        })?;
        let dir = watch_dir(&self.path);

        let tx = self.update_tx;
        let path = self.path.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches_file(&event, &file_name) => {
                    tracing::info!(path = ?path, kind = ?event.kind, "Config file change detected, reloading");
                    match load_config(&path) {
                        Ok(new_config) => {
                            let _ = tx.send(new_config);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, dir = ?dir, "Config watcher started");
        Ok(watcher)
    }
}

/// Directory holding `path`; `.` for a bare file name.
fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether `event` may have changed the file named `file_name`.
///
/// Removal alone is ignored: the following create or rename reloads.
fn touches_file(event: &Event, file_name: &OsString) -> bool {
    let relevant_kind = matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_));
    relevant_kind
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}
