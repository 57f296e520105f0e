//! Application layer - the workspace and the command handlers.
//!
//! Handlers coordinate domain operations with the ports. Each takes the
//! workspace by mutable reference for the length of one command.

pub mod handlers;
mod workspace;

pub use handlers::{
    ActivateAnalysisCommand, ActivateAnalysisHandler, AnalysisError, DeleteAnalysisCommand,
    DeleteAnalysisHandler, DeleteAnalysisResult, FeedbackTarget, GenerateDraftCommand,
    GenerateDraftHandler, GenerateDraftResult, RenameAnalysisCommand, RenameAnalysisHandler,
    RunDeepDiveCommand, RunDeepDiveHandler, RunDeepDiveResult, RunGapReviewCommand,
    RunGapReviewHandler, RunGapReviewResult, SendChatMessageCommand, SendChatMessageHandler,
    SendChatMessageResult, UpdateFeedbackCommand, UpdateFeedbackHandler, UpdateFeedbackResult,
};
pub use workspace::{RunStatus, Workspace};
