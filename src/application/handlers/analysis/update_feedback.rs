//! UpdateFeedback command handler.
//!
//! Records the user's verdict on a suggestion or action item and feeds it
//! back into the learnings cache.

use std::sync::Arc;

use tracing::info;

use super::errors::AnalysisError;
use crate::application::Workspace;
use crate::config::AnalysisConfig;
use crate::domain::analysis::{FeedbackUpdate, ResultPatch, UserFeedback};
use crate::domain::foundation::{ActionItemId, AnalysisId, SuggestionId, Timestamp};
use crate::ports::StateStore;

/// What the feedback is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackTarget {
    Suggestion(SuggestionId),
    ActionItem(ActionItemId),
}

/// Command to update feedback on one item of a saved analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFeedbackCommand {
    pub analysis_id: AnalysisId,
    pub target: FeedbackTarget,
    pub update: FeedbackUpdate,
}

/// Result of a feedback update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateFeedbackResult {
    pub feedback: UserFeedback,
    /// Whether the item now contributes a learning.
    pub became_learning: bool,
    pub learnings_cached: usize,
}

/// Handler for UpdateFeedback commands.
pub struct UpdateFeedbackHandler {
    state_store: Arc<dyn StateStore>,
    config: AnalysisConfig,
}

impl UpdateFeedbackHandler {
    pub fn new(state_store: Arc<dyn StateStore>, config: AnalysisConfig) -> Self {
        Self {
            state_store,
            config,
        }
    }

    pub async fn handle(
        &self,
        cmd: UpdateFeedbackCommand,
        workspace: &mut Workspace,
    ) -> Result<UpdateFeedbackResult, AnalysisError> {
        if cmd.update.is_empty() {
            return Err(AnalysisError::validation("Feedback update carries no fields"));
        }

        // 1. Locate the analysis and the item
        let analysis = workspace
            .analyses()
            .get(cmd.analysis_id)
            .ok_or(AnalysisError::AnalysisNotFound(cmd.analysis_id))?;
        let now = Timestamp::now();

        // 2. Build the patched list with the item's feedback overwritten
        let (patch, feedback) = match cmd.target {
            FeedbackTarget::Suggestion(id) => {
                let mut changes = analysis.result.suggested_changes().to_vec();
                let item = changes
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or_else(|| AnalysisError::NotFound(format!("Suggestion {}", id)))?;
                let feedback = UserFeedback::apply(item.user_feedback.as_ref(), cmd.update, now);
                item.user_feedback = Some(feedback.clone());
                (
                    ResultPatch {
                        suggested_changes: Some(changes),
                        ..ResultPatch::default()
                    },
                    feedback,
                )
            }
            FeedbackTarget::ActionItem(id) => {
                let mut plan = analysis.result.action_plan().to_vec();
                let item = plan
                    .iter_mut()
                    .find(|a| a.id == id)
                    .ok_or_else(|| AnalysisError::NotFound(format!("Action item {}", id)))?;
                let feedback = UserFeedback::apply(item.user_feedback.as_ref(), cmd.update, now);
                item.user_feedback = Some(feedback.clone());
                (
                    ResultPatch {
                        action_plan: Some(plan),
                        ..ResultPatch::default()
                    },
                    feedback,
                )
            }
        };

        // 3. Merge, refresh learnings, persist
        workspace
            .analyses_mut()
            .merge_feedback_at(cmd.analysis_id, patch, now)?;
        workspace.refresh_learnings(self.config.max_chat_learnings);

        info!(
            analysis_id = %cmd.analysis_id,
            status = feedback.status.as_deref().unwrap_or(""),
            "Feedback updated"
        );

        workspace.persist(self.state_store.as_ref()).await?;

        Ok(UpdateFeedbackResult {
            became_learning: feedback.qualifies_as_learning(),
            feedback,
            learnings_cached: workspace.learnings().len(),
        })
    }
}
