use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{BoardSnapshot, SnapshotStore};

/// Debounced writer: snapshots scheduled within `debounce` of each other
/// collapse into a single save of the latest one.
pub struct Autosave;

/// Cheap to clone; dropping every handle flushes the pending snapshot and
/// stops the task.
#[derive(Debug, Clone)]
pub struct AutosaveHandle {
    tx: mpsc::UnboundedSender<BoardSnapshot>,
}

impl AutosaveHandle {
    /// Queues a snapshot. Returns false when the saver is gone.
    pub fn schedule(&self, snapshot: BoardSnapshot) -> bool {
        self.tx.send(snapshot).is_ok()
    }
}

impl Autosave {
    pub fn spawn(
        stores: Vec<Arc<dyn SnapshotStore>>,
        debounce: Duration,
    ) -> (AutosaveHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<BoardSnapshot>();
        let task = tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    match tokio::time::timeout(debounce, rx.recv()).await {
                        Ok(Some(next)) => latest = next,
                        Ok(None) => {
                            save_all(&stores, &latest).await;
                            return;
                        }
                        Err(_) => break,
                    }
                }
                save_all(&stores, &latest).await;
            }
        });
        (AutosaveHandle { tx }, task)
    }
}

async fn save_all(stores: &[Arc<dyn SnapshotStore>], snapshot: &BoardSnapshot) {
    for store in stores {
        match store.save(snapshot).await {
            Ok(()) => tracing::debug!(store = store.name(), "snapshot saved"),
            Err(e) => tracing::warn!(store = store.name(), error = %e, "failed to save snapshot"),
        }
    }
}
