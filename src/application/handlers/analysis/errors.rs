//! Run-level errors shared by the analysis handlers.

use thiserror::Error;

use crate::domain::analysis::{AnalysisType, OutputParseError, StoreError};
use crate::domain::foundation::{AnalysisId, DocumentId, ErrorCode, ValidationError};
use crate::ports::{GenerationError, RetrievalError, StateStoreError};

/// Errors surfaced by analysis, feedback, chat and draft commands.
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// A required selection or value was missing. No collaborator was called.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("A {0} run is already in progress")]
    RunInProgress(&'static str),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Output could not be parsed even after repair. `raw` keeps the
    /// generator text for diagnostics; it is never persisted.
    #[error("Could not parse generator output: {message}")]
    Parse { message: String, raw: String },

    #[error("Analysis not found: {0}")]
    AnalysisNotFound(AnalysisId),

    /// A suggestion, action item or referenced document is missing.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AnalysisError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn run_in_progress(analysis_type: AnalysisType) -> Self {
        Self::RunInProgress(analysis_type.label())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AnalysisError::Validation(_) => ErrorCode::ValidationFailed,
            AnalysisError::DocumentNotFound(_) => ErrorCode::DocumentNotFound,
            AnalysisError::RunInProgress(_) => ErrorCode::RunInProgress,
            AnalysisError::Retrieval(_) => ErrorCode::RetrievalFailed,
            AnalysisError::Generation(_) => ErrorCode::GenerationFailed,
            AnalysisError::Parse { .. } => ErrorCode::OutputParseFailed,
            AnalysisError::AnalysisNotFound(_) => ErrorCode::AnalysisNotFound,
            AnalysisError::NotFound(_) => ErrorCode::ItemNotFound,
            AnalysisError::Storage(_) => ErrorCode::StorageError,
        }
    }
}

impl From<OutputParseError> for AnalysisError {
    fn from(err: OutputParseError) -> Self {
        AnalysisError::Parse {
            message: err.message,
            raw: err.raw,
        }
    }
}

impl From<ValidationError> for AnalysisError {
    fn from(err: ValidationError) -> Self {
        AnalysisError::Validation(err.to_string())
    }
}

impl From<StoreError> for AnalysisError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AnalysisError::AnalysisNotFound(id),
            StoreError::Validation(e) => AnalysisError::Validation(e.to_string()),
        }
    }
}

impl From<StateStoreError> for AnalysisError {
    fn from(err: StateStoreError) -> Self {
        AnalysisError::Storage(err.to_string())
    }
}
