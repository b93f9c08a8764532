pub mod event;

use std::path::Path;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as tokio_mpsc;
use tokio::task::JoinHandle;

use event::ChangeEvent;

/// Handle to a running watcher. Keeps the OS watcher alive (dropping stops watching).
pub struct WatcherHandle {
    /// Keep alive: dropping the watcher stops the OS watch and closes the bridge channel.
    _watcher: RecommendedWatcher,
    /// The bridge task forwarding events from std channel to tokio channel.
    _bridge_task: JoinHandle<()>,
}

/// Start a recursive, undebounced watcher on `watch_root`.
///
/// Returns a `WatcherHandle` (must be kept alive) and a tokio mpsc receiver
/// that yields one `ChangeEvent` per changed path. Every raw event is forwarded;
/// nothing is coalesced, so a burst of edits yields a burst of events.
pub fn start_watcher(
    watch_root: &Path,
) -> anyhow::Result<(WatcherHandle, tokio_mpsc::Receiver<ChangeEvent>)> {
    let (std_tx, std_rx) = std::sync::mpsc::channel::<notify::Result<notify::Event>>();

    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = std_tx.send(res);
    })?;
    watcher.watch(watch_root, RecursiveMode::Recursive)?;

    // Tokio channel for classified events
    let (tokio_tx, tokio_rx) = tokio_mpsc::channel::<ChangeEvent>(256);

    // Bridge: spawn_blocking to receive from std channel, classify, forward to tokio
    let bridge_task = tokio::task::spawn_blocking(move || {
        while let Ok(result) = std_rx.recv() {
            match result {
                Ok(raw) => {
                    for change in event::classify(raw) {
                        if tokio_tx.blocking_send(change).is_err() {
                            return; // receiver dropped, shutdown
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "watcher error");
                }
            }
        }
        tracing::debug!("watcher bridge closed");
    });

    Ok((
        WatcherHandle {
            _watcher: watcher,
            _bridge_task: bridge_task,
        },
        tokio_rx,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    use super::event::ChangeKind;

    #[tokio::test]
    async fn test_watcher_reports_new_file_in_nested_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("partials")).unwrap();

        let (_handle, mut rx) = start_watcher(&root).expect("start watcher");
        // Give the backend a moment to register the recursive watch
        tokio::time::sleep(Duration::from_millis(100)).await;

        let target = root.join("partials").join("row.handlebars");
        fs::write(&target, "<tr>{{name}}</tr>").unwrap();

        let found = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(change) = rx.recv().await {
                if change.path.file_name() == target.file_name() {
                    return Some(change);
                }
            }
            None
        })
        .await
        .expect("timed out waiting for watch event")
        .expect("channel closed before event");

        assert!(
            matches!(found.kind, ChangeKind::Created | ChangeKind::Modified),
            "unexpected kind {:?}",
            found.kind
        );
    }

    #[tokio::test]
    async fn test_watcher_rejects_missing_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope");
        assert!(start_watcher(&missing).is_err());
    }
}
