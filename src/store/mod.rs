//! Persistence of the board: a remote blob endpoint, a local directory of
//! JSON files, and the debounced autosave that feeds them.

pub mod autosave;
pub mod local;
pub mod remote;
pub mod snapshot;

use async_trait::async_trait;

use crate::error::StoreError;

pub use autosave::{Autosave, AutosaveHandle};
pub use local::LocalStore;
pub use remote::RemoteStore;
pub use snapshot::{BoardSnapshot, SaveEnvelope, SNAPSHOT_KEYS};

/// Somewhere a board snapshot can be loaded from and saved to
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &str;

    async fn load(&self) -> Result<BoardSnapshot, StoreError>;

    async fn save(&self, snapshot: &BoardSnapshot) -> Result<(), StoreError>;
}

/// Loads the startup snapshot: each key comes from the remote store when it
/// has it, otherwise from the local fallback. Failures are logged and
/// treated as "nothing stored".
pub async fn load_initial(
    remote: Option<&dyn SnapshotStore>,
    local: Option<&dyn SnapshotStore>,
) -> BoardSnapshot {
    let from_remote = match remote {
        Some(store) => load_logged(store).await,
        None => BoardSnapshot::default(),
    };
    let from_local = match local {
        Some(store) => load_logged(store).await,
        None => BoardSnapshot::default(),
    };
    from_remote.or(from_local)
}

async fn load_logged(store: &dyn SnapshotStore) -> BoardSnapshot {
    match store.load().await {
        Ok(snapshot) => {
            tracing::info!(store = store.name(), empty = snapshot.is_empty(), "loaded snapshot");
            snapshot
        }
        Err(e) => {
            tracing::warn!(store = store.name(), error = %e, "failed to load snapshot");
            BoardSnapshot::default()
        }
    }
}
