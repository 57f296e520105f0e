//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, errors, text helpers)
//! - `documents` - Company documents, regulatory inputs and retrieved chunks
//! - `analysis` - Analysis results, feedback, output repair/parsing and the store
//! - `learning` - Learnings extracted from feedback and their selection
//! - `chat` - Chat messages
//! - `prompt` - Pure prompt composition

pub mod analysis;
pub mod chat;
pub mod documents;
pub mod foundation;
pub mod learning;
pub mod prompt;
