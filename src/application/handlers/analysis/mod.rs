//! Analysis command handlers.
//!
//! Gap Review and Deep Dive runs, feedback on their results, the chat
//! surface, draft generation and management of saved analyses.

mod activate_analysis;
mod delete_analysis;
mod errors;
mod generate_draft;
mod rename_analysis;
mod run_deep_dive;
mod run_gap_review;
mod send_chat_message;
mod support;
mod update_feedback;

pub use activate_analysis::{ActivateAnalysisCommand, ActivateAnalysisHandler};
pub use delete_analysis::{DeleteAnalysisCommand, DeleteAnalysisHandler, DeleteAnalysisResult};
pub use errors::AnalysisError;
pub use generate_draft::{GenerateDraftCommand, GenerateDraftHandler, GenerateDraftResult};
pub use rename_analysis::{RenameAnalysisCommand, RenameAnalysisHandler};
pub use run_deep_dive::{RunDeepDiveCommand, RunDeepDiveHandler, RunDeepDiveResult};
pub use run_gap_review::{RunGapReviewCommand, RunGapReviewHandler, RunGapReviewResult};
pub use send_chat_message::{
    SendChatMessageCommand, SendChatMessageHandler, SendChatMessageResult,
};
pub use update_feedback::{
    FeedbackTarget, UpdateFeedbackCommand, UpdateFeedbackHandler, UpdateFeedbackResult,
};
