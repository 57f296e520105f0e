//! RenameAnalysis command handler.

use std::sync::Arc;

use tracing::info;

use super::errors::AnalysisError;
use crate::application::Workspace;
use crate::domain::foundation::AnalysisId;
use crate::ports::StateStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameAnalysisCommand {
    pub analysis_id: AnalysisId,
    pub new_name: String,
}

pub struct RenameAnalysisHandler {
    state_store: Arc<dyn StateStore>,
}

impl RenameAnalysisHandler {
    pub fn new(state_store: Arc<dyn StateStore>) -> Self {
        Self { state_store }
    }

    /// Trims the new name; a blank name is a validation error.
    pub async fn handle(
        &self,
        cmd: RenameAnalysisCommand,
        workspace: &mut Workspace,
    ) -> Result<(), AnalysisError> {
        workspace
            .analyses_mut()
            .rename(cmd.analysis_id, &cmd.new_name)?;
        workspace.persist(self.state_store.as_ref()).await?;

        info!(analysis_id = %cmd.analysis_id, "Analysis renamed");
        Ok(())
    }
}
