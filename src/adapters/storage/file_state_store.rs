//! File-based State Store Adapter
//!
//! Stores each workspace collection as `<data_dir>/<key>.json`.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{StateKey, StateStore, StateStoreError};

/// File-based store for workspace blobs
#[derive(Debug, Clone)]
pub struct FileStateStore {
    base_path: PathBuf,
}

impl FileStateStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// The directory is created lazily on first save.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the file path for a key
    fn key_path(&self, key: StateKey) -> PathBuf {
        self.base_path.join(format!("{}.json", key.as_str()))
    }

    async fn ensure_dir(&self) -> Result<(), StateStoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StateStoreError::IoError(e.to_string()))
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self, key: StateKey) -> Result<Option<String>, StateStoreError> {
        match fs::read_to_string(self.key_path(key)).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StateStoreError::IoError(e.to_string())),
        }
    }

    async fn save(&self, key: StateKey, blob: String) -> Result<(), StateStoreError> {
        self.ensure_dir().await?;

        // Atomic replace via a sibling temp file
        let path = self.key_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, blob)
            .await
            .map_err(|e| StateStoreError::IoError(e.to_string()))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| StateStoreError::IoError(e.to_string()))
    }

    async fn remove(&self, key: StateKey) -> Result<(), StateStoreError> {
        match fs::remove_file(self.key_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateStoreError::IoError(e.to_string())),
        }
    }
}
