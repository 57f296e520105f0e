//! Retriever Adapters.
//!
//! - `MockRetriever` - Scripted chunk sets for testing

mod mock_retriever;

pub use mock_retriever::{MockRetriever, RetrievalCall};
