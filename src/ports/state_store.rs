//! State Store Port - Interface for local durability of the workspace.
//!
//! Each collection is stored as its own JSON blob under a fixed key. An
//! empty collection is represented by the key being absent.

use async_trait::async_trait;
use std::fmt;

/// Keys of the independently stored workspace collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    ChatHistory,
    CompanyDocuments,
    RegulatoryInputs,
    SavedAnalyses,
    ActiveAnalysisId,
    LearningsCache,
}

impl StateKey {
    pub fn all() -> &'static [StateKey] {
        &[
            StateKey::ChatHistory,
            StateKey::CompanyDocuments,
            StateKey::RegulatoryInputs,
            StateKey::SavedAnalyses,
            StateKey::ActiveAnalysisId,
            StateKey::LearningsCache,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StateKey::ChatHistory => "chatHistory",
            StateKey::CompanyDocuments => "companyDocuments",
            StateKey::RegulatoryInputs => "regulatoryInputs",
            StateKey::SavedAnalyses => "savedAnalyses",
            StateKey::ActiveAnalysisId => "activeAnalysisId",
            StateKey::LearningsCache => "learningsCache",
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur during state store operations
#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    #[error("Failed to serialize {key}: {message}")]
    SerializationFailed { key: StateKey, message: String },

    #[error("Failed to deserialize {key}: {message}")]
    DeserializationFailed { key: StateKey, message: String },

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for persisting workspace blobs
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Loads the blob stored under `key`, or `None` when absent.
    async fn load(&self, key: StateKey) -> Result<Option<String>, StateStoreError>;

    /// Stores `blob` under `key`, replacing any previous value.
    async fn save(&self, key: StateKey, blob: String) -> Result<(), StateStoreError>;

    /// Deletes `key`. Removing an absent key succeeds.
    async fn remove(&self, key: StateKey) -> Result<(), StateStoreError>;
}
