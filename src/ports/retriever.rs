//! Retriever Port - Interface for similarity search over the document corpus.
//!
//! How chunks are indexed and scored is the adapter's business. The core
//! only assumes the stream is finite and roughly most-relevant-first.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::domain::documents::RetrievedChunk;

/// A finite, lazily produced sequence of chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = RetrievedChunk> + Send>>;

/// Port for context retrieval.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Returns at most `top_k` chunks relevant to `query`.
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<ChunkStream, RetrievalError>;
}

/// Retriever errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetrievalError {
    #[error("retriever unavailable: {0}")]
    Unavailable(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("index error: {0}")]
    Index(String),
}

impl RetrievalError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
