//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps and error types that form the
//! vocabulary of the compliance domain.

mod errors;
mod ids;
mod text;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{ActionItemId, AnalysisId, DocumentId, SuggestionId};
pub use text::{truncate_chars, truncate_with_ellipsis};
pub use timestamp::Timestamp;
