use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{BoardSnapshot, SnapshotStore, SNAPSHOT_KEYS};
use crate::error::StoreError;

/// Keyed JSON blobs in a directory, one file per snapshot key
/// (`data1.json`, `reserve.json`, ...)
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl SnapshotStore for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn load(&self) -> Result<BoardSnapshot, StoreError> {
        let mut blobs = Vec::new();
        for key in SNAPSHOT_KEYS {
            let path = self.blob_path(key);
            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::io(&path, e)),
            };
            match serde_json::from_str(&raw) {
                Ok(value) => blobs.push((key, value)),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable blob"),
            }
        }
        Ok(BoardSnapshot::from_blobs(blobs)?)
    }

    async fn save(&self, snapshot: &BoardSnapshot) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?;
        for (key, blob) in snapshot.to_blobs()? {
            let path = self.blob_path(key);
            let raw = serde_json::to_string_pretty(&blob)?;
            tokio::fs::write(&path, raw)
                .await
                .map_err(|e| StoreError::io(&path, e))?;
        }
        Ok(())
    }
}
