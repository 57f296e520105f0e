//! Analysis module - results, feedback and the saved-analysis history.
//!
//! # Components
//!
//! - `AnalysisResult` - Gap Review or Deep Dive output, tagged by type
//! - `SuggestedChange` / `ActionPlanItem` - individual findings with feedback
//! - `SavedAnalysis` - one persisted run with its prompts and inputs
//! - `AnalysisStore` - most-recent-first history plus the active pointer
//! - `json_repair` / `parser` - turning untrusted generator text into results

mod feedback;
mod grounding;
mod items;
pub mod json_repair;
mod parser;
mod priority;
mod result;
mod saved;
mod store;

pub use feedback::{FeedbackUpdate, UserFeedback, STATUS_ACTIONED, STATUS_NOT_APPLICABLE};
pub use grounding::{GroundingChunk, GroundingMetadata, WebSource};
pub use items::{ActionPlanItem, SuggestedChange};
pub use json_repair::{repair, RepairError};
pub use parser::{parse_deep_dive, parse_gap_review, OutputParseError, MISSING_TEXT};
pub use priority::Priority;
pub use result::{
    AnalysisResult, AnalysisType, DeepDiveResult, GapReviewResult, ResultPatch, DEFAULT_GROUP,
};
pub use saved::SavedAnalysis;
pub use store::{AnalysisStore, StoreError};
