//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Generator implementations (Gemini, mock)
//! - `retrieval` - Retriever implementations (mock)
//! - `ingestion` - Ingestor implementations (mock)
//! - `storage` - StateStore implementations (file, in-memory)

pub mod ai;
pub mod ingestion;
pub mod retrieval;
pub mod storage;

pub use ai::{GeminiConfig, GeminiGenerator, MockGenerator, MockOutcome};
pub use ingestion::MockIngestor;
pub use retrieval::{MockRetriever, RetrievalCall};
pub use storage::{FileStateStore, InMemoryStateStore};
