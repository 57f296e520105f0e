//! RunDeepDive command handler.
//!
//! Audits a single company document against legislative context, related
//! company documents and public web search.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::errors::AnalysisError;
use super::support::{ingest_pending, retrieve_all};
use crate::application::{RunStatus, Workspace};
use crate::config::AnalysisConfig;
use crate::domain::analysis::{parse_deep_dive, AnalysisResult, AnalysisType, SavedAnalysis};
use crate::domain::documents::{CompanyDocument, DocumentRef, RetrievedChunk, SourceKind};
use crate::domain::foundation::{AnalysisId, DocumentId, Timestamp};
use crate::domain::learning::{extract_all, select_for_prompt};
use crate::domain::prompt::{compose_deep_dive, referenced_regulatory_inputs};
use crate::ports::{GenerationRequest, Generator, IngestDocument, Ingestor, Retriever, StateStore};

/// Command to run a Deep Dive on one company document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDeepDiveCommand {
    pub document_id: DocumentId,
}

impl RunDeepDiveCommand {
    pub fn new(document_id: DocumentId) -> Self {
        Self { document_id }
    }
}

/// Result of a successful Deep Dive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDeepDiveResult {
    pub analysis_id: AnalysisId,
    pub suggestion_count: usize,
    pub action_count: usize,
    pub referenced_regulatory_inputs: Vec<String>,
    pub web_sources: usize,
}

/// Handler for RunDeepDive commands.
pub struct RunDeepDiveHandler {
    generator: Arc<dyn Generator>,
    retriever: Arc<dyn Retriever>,
    ingestor: Arc<dyn Ingestor>,
    state_store: Arc<dyn StateStore>,
    config: AnalysisConfig,
}

impl RunDeepDiveHandler {
    pub fn new(
        generator: Arc<dyn Generator>,
        retriever: Arc<dyn Retriever>,
        ingestor: Arc<dyn Ingestor>,
        state_store: Arc<dyn StateStore>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            generator,
            retriever,
            ingestor,
            state_store,
            config,
        }
    }

    pub async fn handle(
        &self,
        cmd: RunDeepDiveCommand,
        workspace: &mut Workspace,
    ) -> Result<RunDeepDiveResult, AnalysisError> {
        if workspace.status(AnalysisType::DeepDive).is_loading() {
            return Err(AnalysisError::run_in_progress(AnalysisType::DeepDive));
        }

        // 1. Resolve the target
        let Some(target) = workspace.company_document(&cmd.document_id).cloned() else {
            let err = AnalysisError::DocumentNotFound(cmd.document_id);
            workspace.set_status(AnalysisType::DeepDive, RunStatus::Error(err.to_string()));
            return Err(err);
        };

        info!(document = %target.name, "Starting deep dive");

        workspace.set_status(AnalysisType::DeepDive, RunStatus::Loading);
        workspace.analyses_mut().clear_active();

        let result = match self.run(&target, workspace).await {
            Ok(result) => result,
            Err(err) => {
                error!(document = %target.name, error = %err, code = %err.code(), "Deep dive failed");
                workspace.set_status(AnalysisType::DeepDive, RunStatus::Error(err.to_string()));
                return Err(err);
            }
        };

        info!(
            analysis_id = %result.analysis_id,
            suggestions = result.suggestion_count,
            web_sources = result.web_sources,
            "Deep dive complete"
        );

        // 7. Persist, then report success
        if let Err(err) = workspace.persist(self.state_store.as_ref()).await {
            let err = AnalysisError::from(err);
            error!(error = %err, code = %err.code(), "Deep dive could not be saved");
            workspace.set_status(AnalysisType::DeepDive, RunStatus::Error(err.to_string()));
            return Err(err);
        }
        workspace.set_status(AnalysisType::DeepDive, RunStatus::Success(result.analysis_id));
        Ok(result)
    }

    async fn run(
        &self,
        target: &CompanyDocument,
        workspace: &mut Workspace,
    ) -> Result<RunDeepDiveResult, AnalysisError> {
        let budget = self.config.prompt_budget();

        // 2. Best-effort ingestion of the target
        if !target.is_processed_for_rag {
            ingest_pending(
                self.ingestor.as_ref(),
                workspace,
                vec![IngestDocument::from(target)],
            )
            .await;
        }

        // 3. Legislative context, then related company documents
        let legislative = retrieve_all(
            self.retriever.as_ref(),
            &legislative_query(&target.name),
            self.config.deep_dive_legislative_top_k,
        )
        .await?;
        let cross_reference = retrieve_all(
            self.retriever.as_ref(),
            &cross_reference_query(&target.name),
            self.config.deep_dive_cross_reference_top_k,
        )
        .await?;

        let all_learnings = extract_all(workspace.saved_analyses(), None);
        let learnings = select_for_prompt(
            &all_learnings,
            &[target.name.as_str()],
            self.config.max_prompt_learnings,
        );

        // 4. Compose and generate with web search
        let prompt = compose_deep_dive(target, &legislative, &cross_reference, &learnings, &budget);
        debug!(
            legislative = legislative.len(),
            cross_reference = cross_reference.len(),
            user_chars = prompt.user.len(),
            "Deep dive prompt composed"
        );

        let response = self
            .generator
            .generate(
                GenerationRequest::new(prompt.user.clone())
                    .with_system_instruction(prompt.system.clone())
                    .with_web_search(),
            )
            .await?;

        // 5. Repair and parse
        let referenced = referenced_regulatory_inputs(&legislative);
        let result = parse_deep_dive(&response.text, &target.name, &referenced).map_err(|err| {
            error!(raw = %err.raw_preview(), "Deep dive output could not be parsed");
            err
        })?;

        let suggestion_count = result.suggested_changes.len();
        let action_count = result.action_plan.len();
        let referenced_regulatory_inputs = result
            .referenced_regulatory_inputs
            .clone()
            .unwrap_or_default();
        let web_sources = response
            .grounding
            .as_ref()
            .map(|g| g.web_sources().count())
            .unwrap_or(0);

        // 6. Save as the new active analysis
        let now = Timestamp::now();
        let analysis = SavedAnalysis::new(
            format!("Deep Dive: {} - {}", target.name, now.date_label()),
            AnalysisResult::DeepDive(result),
        )
        .with_timestamp(now)
        .with_inputs(inputs_used(target, &legislative))
        .with_learnings(learnings)
        .with_prompts(prompt.system, prompt.user)
        .with_grounding(response.grounding);
        let analysis_id = analysis.id;

        workspace.analyses_mut().add(analysis);
        workspace.analyses_mut().set_active(analysis_id)?;
        workspace.refresh_learnings(self.config.max_chat_learnings);

        Ok(RunDeepDiveResult {
            analysis_id,
            suggestion_count,
            action_count,
            referenced_regulatory_inputs,
            web_sources,
        })
    }
}

fn legislative_query(name: &str) -> String {
    format!("regulatory requirements AUSTRAC AML/CTF applicable to {}", name)
}

fn cross_reference_query(name: &str) -> String {
    format!("{} related internal policies and procedures", name)
}

/// The target plus every distinct regulatory source that reached the prompt.
fn inputs_used(
    target: &CompanyDocument,
    legislative: &[RetrievedChunk],
) -> Vec<DocumentRef> {
    let mut inputs = vec![target.to_ref()];
    for chunk in legislative {
        if chunk.source_document_type == SourceKind::Regulatory
            && !inputs.iter().any(|r| r.id == chunk.source_document_id)
        {
            inputs.push(DocumentRef {
                id: chunk.source_document_id.clone(),
                name: chunk.source_document_name.clone(),
                kind: SourceKind::Regulatory,
            });
        }
    }
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockGenerator;
    use crate::adapters::ingestion::MockIngestor;
    use crate::adapters::retrieval::MockRetriever;
    use crate::adapters::storage::InMemoryStateStore;
    use crate::domain::analysis::{GroundingChunk, GroundingMetadata, WebSource};
    use crate::ports::{GenerationError, RetrievalError};

    const OUTPUT: &str = r#"{
  "documentTitleAnalyzed": "KYC Policy.pdf",
  "overallSummary": "Broadly aligned",
  "keyThemesAndTopics": ["CDD", "PEPs"],
  "suggestedChanges": [
    { "currentStatusSummary": "No PEP checks", "suggestedModification": "Add PEP checks", "priority": "High" }
  ],
  "actionPlan": [
    { "task": "Draft PEP procedure", "responsible": "MLRO", "timeline": "30 days", "priorityLevel": "Critical" }
  ]
}"#;

    fn id(s: &str) -> DocumentId {
        DocumentId::new(s).unwrap()
    }

    fn workspace() -> Workspace {
        let mut ws = Workspace::new();
        ws.upsert_company_document(CompanyDocument::new(
            id("c1"),
            "KYC Policy.pdf",
            "We verify identity.",
        ));
        ws
    }

    fn chunk(doc: &str, name: &str, kind: SourceKind, text: &str) -> RetrievedChunk {
        RetrievedChunk::new(format!("{}-1", doc), id(doc), name, kind, text)
    }

    fn grounding() -> GroundingMetadata {
        GroundingMetadata {
            grounding_chunks: vec![GroundingChunk {
                web: Some(WebSource {
                    uri: Some("https://www.austrac.gov.au".into()),
                    title: Some("AUSTRAC".into()),
                }),
            }],
            web_search_queries: vec!["AUSTRAC PEP guidance".into()],
        }
    }

    struct Fixture {
        generator: MockGenerator,
        retriever: MockRetriever,
        ingestor: MockIngestor,
        store: InMemoryStateStore,
    }

    impl Fixture {
        fn new(generator: MockGenerator, retriever: MockRetriever) -> Self {
            Self {
                generator,
                retriever,
                ingestor: MockIngestor::new(),
                store: InMemoryStateStore::new(),
            }
        }

        fn handler(&self) -> RunDeepDiveHandler {
            RunDeepDiveHandler::new(
                Arc::new(self.generator.clone()),
                Arc::new(self.retriever.clone()),
                Arc::new(self.ingestor.clone()),
                Arc::new(self.store.clone()),
                AnalysisConfig::default(),
            )
        }
    }

    fn retriever() -> MockRetriever {
        MockRetriever::new()
            .with_chunks(vec![
                chunk("r1", "AML/CTF Act", SourceKind::Regulatory, "Act passage"),
                chunk("r1", "AML/CTF Act", SourceKind::Regulatory, "second passage"),
            ])
            .with_chunks(vec![
                chunk("c1", "KYC Policy.pdf", SourceKind::Company, "SELF PASSAGE"),
                chunk("c2", "Onboarding.docx", SourceKind::Company, "Onboarding passage"),
            ])
    }

    #[tokio::test]
    async fn missing_document_sets_error_without_calls() {
        let fixture = Fixture::new(MockGenerator::new(), retriever());
        let mut ws = workspace();

        let err = fixture
            .handler()
            .handle(RunDeepDiveCommand::new(id("ghost")), &mut ws)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::DocumentNotFound(_)));
        assert!(matches!(ws.status(AnalysisType::DeepDive), RunStatus::Error(_)));
        assert_eq!(fixture.retriever.call_count(), 0);
        assert_eq!(fixture.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn runs_two_retrievals_and_uses_web_search() {
        let fixture = Fixture::new(
            MockGenerator::new().with_grounded_response(OUTPUT, grounding()),
            retriever(),
        );
        let mut ws = workspace();

        let result = fixture
            .handler()
            .handle(RunDeepDiveCommand::new(id("c1")), &mut ws)
            .await
            .unwrap();

        let calls = fixture.retriever.get_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].top_k, 10);
        assert!(calls[0].query.contains("KYC Policy.pdf"));
        assert_eq!(calls[1].top_k, 5);

        let request = fixture.generator.last_call().unwrap();
        assert!(request.web_search);
        assert!(!request.prompt.contains("SELF PASSAGE"));
        assert!(request.prompt.contains("Onboarding passage"));

        assert_eq!(result.referenced_regulatory_inputs, vec!["AML/CTF Act".to_string()]);
        assert_eq!(result.web_sources, 1);
    }

    #[tokio::test]
    async fn saves_normalised_result_with_grounding() {
        let fixture = Fixture::new(
            MockGenerator::new().with_grounded_response(OUTPUT, grounding()),
            retriever(),
        );
        let mut ws = workspace();

        let result = fixture
            .handler()
            .handle(RunDeepDiveCommand::new(id("c1")), &mut ws)
            .await
            .unwrap();

        let saved = ws.analyses().active().unwrap();
        assert_eq!(saved.id, result.analysis_id);
        assert!(saved.name.starts_with("Deep Dive: KYC Policy.pdf - "));
        assert_eq!(saved.grounding_metadata, Some(grounding()));
        assert_eq!(saved.inputs_used.len(), 2);

        let AnalysisResult::DeepDive(dive) = &saved.result else {
            panic!("expected a deep dive");
        };
        assert_eq!(dive.suggested_changes[0].document_section, "KYC Policy.pdf");
        assert_eq!(
            dive.action_plan[0].priority_level,
            crate::domain::analysis::Priority::Medium
        );
        assert_eq!(
            ws.status(AnalysisType::DeepDive),
            &RunStatus::Success(result.analysis_id)
        );
        assert!(ws.company_documents()[0].is_processed_for_rag);
    }

    #[tokio::test]
    async fn accepts_fenced_output_after_leading_prose() {
        let response = format!(
            "Based on my web search, here is the audit:\n```json\n{}\n```",
            OUTPUT
        );
        let fixture = Fixture::new(MockGenerator::new().with_response(response), retriever());
        let mut ws = workspace();

        let result = fixture
            .handler()
            .handle(RunDeepDiveCommand::new(id("c1")), &mut ws)
            .await
            .unwrap();

        assert_eq!(result.suggestion_count, 1);
        assert_eq!(ws.analyses().active_id(), Some(result.analysis_id));
    }

    #[tokio::test]
    async fn storage_failure_reports_error_status() {
        let mut fixture = Fixture::new(MockGenerator::new().with_response(OUTPUT), retriever());
        fixture.store = InMemoryStateStore::new().with_failing_writes();
        let mut ws = workspace();

        let err = fixture
            .handler()
            .handle(RunDeepDiveCommand::new(id("c1")), &mut ws)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Storage(_)));
        assert!(matches!(ws.status(AnalysisType::DeepDive), RunStatus::Error(_)));
    }

    #[tokio::test]
    async fn generation_failure_persists_nothing() {
        let fixture = Fixture::new(
            MockGenerator::new().with_error(GenerationError::rate_limited(30)),
            retriever(),
        );
        let mut ws = workspace();

        let err = fixture
            .handler()
            .handle(RunDeepDiveCommand::new(id("c1")), &mut ws)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Generation(_)));
        assert!(ws.analyses().is_empty());
        assert!(fixture.store.is_empty().await);
    }

    #[tokio::test]
    async fn second_retrieval_failure_is_fatal() {
        let fixture = Fixture::new(
            MockGenerator::new(),
            MockRetriever::new()
                .with_chunks(vec![])
                .with_error(RetrievalError::unavailable("index offline")),
        );
        let mut ws = workspace();

        let err = fixture
            .handler()
            .handle(RunDeepDiveCommand::new(id("c1")), &mut ws)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Retrieval(_)));
        assert_eq!(fixture.generator.call_count(), 0);
    }
}
