//! Ingestor Port - Interface for adding documents to the retrieval index.
//!
//! Ingestion is idempotent: sending a document again only refreshes it.

use async_trait::async_trait;

use crate::domain::documents::{CompanyDocument, RegulatoryInput, SourceKind};
use crate::domain::foundation::DocumentId;

/// Port for document ingestion.
#[async_trait]
pub trait Ingestor: Send + Sync {
    async fn ingest(&self, document: IngestDocument) -> Result<IngestOutcome, IngestionError>;
}

/// Text and provenance of a document to index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestDocument {
    pub id: DocumentId,
    pub name: String,
    pub kind: SourceKind,
    pub text: String,
}

impl From<&CompanyDocument> for IngestDocument {
    fn from(doc: &CompanyDocument) -> Self {
        Self {
            id: doc.id.clone(),
            name: doc.name.clone(),
            kind: SourceKind::Company,
            text: doc.text_content.clone(),
        }
    }
}

impl From<&RegulatoryInput> for IngestDocument {
    fn from(input: &RegulatoryInput) -> Self {
        Self {
            id: input.id.clone(),
            name: input.title.clone(),
            kind: SourceKind::Regulatory,
            text: input.raw_content.clone(),
        }
    }
}

/// What the ingestor reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub success: bool,
    pub message: String,
}

impl IngestOutcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestionError {
    #[error("ingestion service unavailable: {0}")]
    Unavailable(String),

    #[error("document rejected: {0}")]
    Rejected(String),
}
