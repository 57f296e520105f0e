//! Ingestor Adapters.
//!
//! - `MockIngestor` - Records ingestion requests for testing

mod mock_ingestor;

pub use mock_ingestor::MockIngestor;
