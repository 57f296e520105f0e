//! Mock Ingestor for testing.
//!
//! Accepts every document by default. Individual documents can be made to
//! fail, either with a transport error or a rejected outcome.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::foundation::DocumentId;
use crate::ports::{IngestDocument, IngestOutcome, IngestionError, Ingestor};

#[derive(Debug, Clone)]
enum Failure {
    Error(IngestionError),
    Outcome(String),
}

/// Mock ingestor for testing.
#[derive(Debug, Clone, Default)]
pub struct MockIngestor {
    failures: Arc<Mutex<HashMap<DocumentId, Failure>>>,
    calls: Arc<Mutex<Vec<IngestDocument>>>,
}

impl MockIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes ingestion of `id` fail with `error`.
    pub fn with_error_for(self, id: DocumentId, error: IngestionError) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(id, Failure::Error(error));
        self
    }

    /// Makes ingestion of `id` report an unsuccessful outcome.
    pub fn with_failed_outcome_for(self, id: DocumentId, message: impl Into<String>) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(id, Failure::Outcome(message.into()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<IngestDocument> {
        self.calls.lock().unwrap().clone()
    }

    /// Ids of every document sent so far, in call order.
    pub fn ingested_ids(&self) -> Vec<DocumentId> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.id.clone())
            .collect()
    }
}

#[async_trait]
impl Ingestor for MockIngestor {
    async fn ingest(&self, document: IngestDocument) -> Result<IngestOutcome, IngestionError> {
        let failure = self.failures.lock().unwrap().get(&document.id).cloned();
        let name = document.name.clone();
        self.calls.lock().unwrap().push(document);

        match failure {
            Some(Failure::Error(err)) => Err(err),
            Some(Failure::Outcome(message)) => Ok(IngestOutcome::failed(message)),
            None => Ok(IngestOutcome::succeeded(format!("Ingested {}", name))),
        }
    }
}
