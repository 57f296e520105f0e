//! Generator Adapters.
//!
//! Implementations of the Generator port.
//!
//! ## Available Adapters
//!
//! - `MockGenerator` - Configurable mock for testing
//! - `GeminiGenerator` - Google Gemini models over the REST API

mod gemini_generator;
mod mock_generator;

pub use gemini_generator::{GeminiConfig, GeminiGenerator};
pub use mock_generator::{MockGenerator, MockOutcome};
