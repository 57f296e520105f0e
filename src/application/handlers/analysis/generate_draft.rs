//! GenerateDraft command handler - rewrites a company document to adopt
//! one suggested change.

use std::sync::Arc;

use tracing::info;

use super::errors::AnalysisError;
use crate::application::Workspace;
use crate::config::AnalysisConfig;
use crate::domain::analysis::SavedAnalysis;
use crate::domain::documents::{CompanyDocument, SourceKind};
use crate::domain::foundation::{AnalysisId, SuggestionId};
use crate::domain::prompt::compose_draft;
use crate::ports::{GenerationRequest, Generator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateDraftCommand {
    pub analysis_id: AnalysisId,
    pub suggestion_id: SuggestionId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateDraftResult {
    pub document_name: String,
    pub draft: String,
}

/// Handler for GenerateDraft commands.
pub struct GenerateDraftHandler {
    generator: Arc<dyn Generator>,
    config: AnalysisConfig,
}

impl GenerateDraftHandler {
    pub fn new(generator: Arc<dyn Generator>, config: AnalysisConfig) -> Self {
        Self { generator, config }
    }

    /// Drafts are returned, not stored. Adopting one is a feedback update.
    pub async fn handle(
        &self,
        cmd: GenerateDraftCommand,
        workspace: &Workspace,
    ) -> Result<GenerateDraftResult, AnalysisError> {
        let analysis = workspace
            .analyses()
            .get(cmd.analysis_id)
            .ok_or(AnalysisError::AnalysisNotFound(cmd.analysis_id))?;

        let suggestion = analysis
            .result
            .suggested_changes()
            .iter()
            .find(|s| s.id == cmd.suggestion_id)
            .ok_or_else(|| AnalysisError::NotFound(format!("Suggestion {}", cmd.suggestion_id)))?;

        let document = source_document(workspace, suggestion.source_document_name.as_deref(), analysis)
            .ok_or_else(|| {
                AnalysisError::NotFound(format!(
                    "Source document for suggestion '{}'",
                    suggestion.document_section
                ))
            })?;

        let prompt = compose_draft(document, suggestion, &self.config.prompt_budget());
        let response = self
            .generator
            .generate(GenerationRequest::new(prompt.user).with_system_instruction(prompt.system))
            .await?;

        info!(
            analysis_id = %cmd.analysis_id,
            document = %document.name,
            "Draft generated"
        );

        Ok(GenerateDraftResult {
            document_name: document.name.clone(),
            draft: response.text.trim().to_string(),
        })
    }
}

/// The named document, else the analysis' only targeted company document.
fn source_document<'a>(
    workspace: &'a Workspace,
    name: Option<&str>,
    analysis: &SavedAnalysis,
) -> Option<&'a CompanyDocument> {
    if let Some(document) = name.and_then(|n| workspace.company_document_by_name(n)) {
        return Some(document);
    }

    let mut company = analysis
        .inputs_used
        .iter()
        .filter(|r| r.kind == SourceKind::Company);
    match (company.next(), company.next()) {
        (Some(only), None) => workspace.company_document(&only.id),
        _ => None,
    }
}
