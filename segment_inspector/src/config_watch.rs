//! Reloads the display configuration when its file changes on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::Sender;
use mirror_core::DisplayConfig;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::app::AppEvent;

/// Keeps the watcher alive; dropping it stops reloads.
pub struct ConfigWatch {
    _watcher: RecommendedWatcher,
}

/// Watches `path` and sends the reparsed config on every change.
///
/// The parent directory is watched so that editors replacing the file on save
/// are still noticed.
pub fn watch_display_config(path: &Path, events: Sender<AppEvent>) -> notify::Result<ConfigWatch> {
    let target = path.to_path_buf();
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = target.file_name().map(|name| name.to_os_string());

    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        let event = match result {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(
                    target: "segment_map::config",
                    error = %err,
                    "display_config.watch_error"
                );
                return;
            }
        };
        if !is_content_change(&event.kind) {
            return;
        }
        let touches_config = event
            .paths
            .iter()
            .any(|changed| changed.file_name().map(|name| name.to_os_string()) == file_name);
        if !touches_config {
            return;
        }
        match DisplayConfig::from_file(&target) {
            Ok(config) => {
                tracing::info!(
                    target: "segment_map::config",
                    path = %target.display(),
                    "display_config.reloaded"
                );
                let _ = events.send(AppEvent::ConfigReloaded(Arc::new(config)));
            }
            Err(err) => {
                tracing::warn!(
                    target: "segment_map::config",
                    path = %target.display(),
                    error = %err,
                    "display_config.reload_failed"
                );
            }
        }
    })?;
    watcher.watch(&directory, RecursiveMode::NonRecursive)?;
    Ok(ConfigWatch { _watcher: watcher })
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}
