//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `Generator` - model text generation, optionally JSON or web-grounded
//! - `Retriever` - similarity search over both corpora
//! - `Ingestor` - adds documents to the retrieval index
//! - `StateStore` - local durability of workspace collections

mod generator;
mod ingestor;
mod retriever;
mod state_store;

pub use generator::{
    GenerationError, GenerationRequest, GenerationResponse, Generator, GeneratorInfo,
};
pub use ingestor::{IngestDocument, IngestOutcome, IngestionError, Ingestor};
pub use retriever::{ChunkStream, RetrievalError, Retriever};
pub use state_store::{StateKey, StateStore, StateStoreError};
