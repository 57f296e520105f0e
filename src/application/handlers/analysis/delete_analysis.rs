//! DeleteAnalysis command handler.

use std::sync::Arc;

use tracing::info;

use super::errors::AnalysisError;
use crate::application::Workspace;
use crate::config::AnalysisConfig;
use crate::domain::foundation::AnalysisId;
use crate::ports::StateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteAnalysisCommand {
    pub analysis_id: AnalysisId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteAnalysisResult {
    pub removed: bool,
    pub was_active: bool,
}

pub struct DeleteAnalysisHandler {
    state_store: Arc<dyn StateStore>,
    config: AnalysisConfig,
}

impl DeleteAnalysisHandler {
    pub fn new(state_store: Arc<dyn StateStore>, config: AnalysisConfig) -> Self {
        Self {
            state_store,
            config,
        }
    }

    /// Unknown ids are a no-op. Deleting the active analysis clears the
    /// displayed result along with it.
    pub async fn handle(
        &self,
        cmd: DeleteAnalysisCommand,
        workspace: &mut Workspace,
    ) -> Result<DeleteAnalysisResult, AnalysisError> {
        let was_active = workspace.analyses().active_id() == Some(cmd.analysis_id);
        let removed = workspace.analyses_mut().delete(cmd.analysis_id);

        if removed {
            workspace.refresh_learnings(self.config.max_chat_learnings);
            workspace.persist(self.state_store.as_ref()).await?;
            info!(analysis_id = %cmd.analysis_id, was_active, "Analysis deleted");
        }

        Ok(DeleteAnalysisResult {
            removed,
            was_active,
        })
    }
}
