//! Local storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ConfigValidationError;
use crate::adapters::storage::FileStateStore;

/// Where the workspace is persisted
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigValidationError::MissingRequired("STORAGE__DATA_DIR"));
        }
        Ok(())
    }

    /// The file-backed state store rooted at `data_dir`.
    pub fn state_store(&self) -> FileStateStore {
        FileStateStore::new(&self.data_dir)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{StateKey, StateStore};

    #[test]
    fn empty_data_dir_is_rejected() {
        let config = StorageConfig {
            data_dir: PathBuf::new(),
        };
        assert!(config.validate().is_err());
        assert!(StorageConfig::default().validate().is_ok());
    }

    #[tokio::test]
    async fn state_store_writes_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: dir.path().join("workspace"),
        };

        config
            .state_store()
            .save(StateKey::LearningsCache, "[]".to_string())
            .await
            .unwrap();

        assert!(dir.path().join("workspace").join("learningsCache.json").exists());
    }
}
