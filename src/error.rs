use thiserror::Error;

/// Failures talking to a snapshot store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("remote store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("local store I/O failed at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
