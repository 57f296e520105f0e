//! Storage Adapters
//!
//! Implementations of the StateStore port for persisting the workspace.
//!
//! ## Available Adapters
//!
//! - **FileStateStore** - One JSON file per state key on disk
//! - **InMemoryStateStore** - Keeps blobs in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileStateStore, InMemoryStateStore};
//!
//! // Production: file-based storage
//! let store = FileStateStore::new("./data/workspace");
//!
//! // Testing: in-memory storage
//! let store = InMemoryStateStore::new();
//! ```

mod file_state_store;
mod in_memory_state_store;

pub use file_state_store::FileStateStore;
pub use in_memory_state_store::InMemoryStateStore;
