//! ActivateAnalysis command handler - selects which saved analysis is
//! displayed, or clears the display.

use std::sync::Arc;

use super::errors::AnalysisError;
use crate::application::Workspace;
use crate::domain::foundation::AnalysisId;
use crate::ports::StateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivateAnalysisCommand {
    /// `None` clears the active analysis.
    pub analysis_id: Option<AnalysisId>,
}

pub struct ActivateAnalysisHandler {
    state_store: Arc<dyn StateStore>,
}

impl ActivateAnalysisHandler {
    pub fn new(state_store: Arc<dyn StateStore>) -> Self {
        Self { state_store }
    }

    pub async fn handle(
        &self,
        cmd: ActivateAnalysisCommand,
        workspace: &mut Workspace,
    ) -> Result<(), AnalysisError> {
        match cmd.analysis_id {
            Some(id) => workspace.analyses_mut().set_active(id)?,
            None => workspace.analyses_mut().clear_active(),
        }
        workspace.persist(self.state_store.as_ref()).await?;

        tracing::debug!(analysis_id = ?cmd.analysis_id, "Active analysis changed");
        Ok(())
    }
}
