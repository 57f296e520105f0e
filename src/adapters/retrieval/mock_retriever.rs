//! Mock Retriever for testing.
//!
//! Returns scripted chunk sets without an index. Two sources are supported:
//!
//! - Queued responses, consumed one per call
//! - A fixed corpus, served (truncated to `top_k`) once the queue is empty
//!
//! Every call is recorded so tests can assert on queries and counts.

use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::documents::RetrievedChunk;
use crate::ports::{ChunkStream, RetrievalError, Retriever};

/// A recorded retrieval call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalCall {
    pub query: String,
    pub top_k: usize,
}

type ScriptedResult = Result<Vec<RetrievedChunk>, RetrievalError>;

/// Mock retriever for testing.
#[derive(Debug, Clone, Default)]
pub struct MockRetriever {
    queued: Arc<Mutex<VecDeque<ScriptedResult>>>,
    corpus: Arc<Mutex<Vec<RetrievedChunk>>>,
    calls: Arc<Mutex<Vec<RetrievalCall>>>,
}

impl MockRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `chunks` for every call that finds the queue empty.
    pub fn with_corpus(self, chunks: Vec<RetrievedChunk>) -> Self {
        *self.corpus.lock().unwrap() = chunks;
        self
    }

    /// Queues the chunk set returned by the next call.
    pub fn with_chunks(self, chunks: Vec<RetrievedChunk>) -> Self {
        self.queued.lock().unwrap().push_back(Ok(chunks));
        self
    }

    /// Queues an error for the next call.
    pub fn with_error(self, error: RetrievalError) -> Self {
        self.queued.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<RetrievalCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<ChunkStream, RetrievalError> {
        self.calls.lock().unwrap().push(RetrievalCall {
            query: query.to_string(),
            top_k,
        });

        let scripted = self.queued.lock().unwrap().pop_front();
        let mut chunks = match scripted {
            Some(result) => result?,
            None => self.corpus.lock().unwrap().clone(),
        };
        chunks.truncate(top_k);

        Ok(Box::pin(stream::iter(chunks)))
    }
}
