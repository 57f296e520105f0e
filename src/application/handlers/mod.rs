//! Application handlers.
//!
//! Command handlers that orchestrate domain operations against the
//! workspace and the ports.

pub mod analysis;

pub use analysis::{
    // Runs
    RunDeepDiveCommand, RunDeepDiveHandler, RunDeepDiveResult,
    RunGapReviewCommand, RunGapReviewHandler, RunGapReviewResult,
    // Feedback and drafts
    FeedbackTarget, UpdateFeedbackCommand, UpdateFeedbackHandler, UpdateFeedbackResult,
    GenerateDraftCommand, GenerateDraftHandler, GenerateDraftResult,
    // Chat
    SendChatMessageCommand, SendChatMessageHandler, SendChatMessageResult,
    // Saved analyses
    ActivateAnalysisCommand, ActivateAnalysisHandler,
    DeleteAnalysisCommand, DeleteAnalysisHandler, DeleteAnalysisResult,
    RenameAnalysisCommand, RenameAnalysisHandler,
    // Errors
    AnalysisError,
};
