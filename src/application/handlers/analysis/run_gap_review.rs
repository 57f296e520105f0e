//! RunGapReview command handler.
//!
//! Compares a set of company documents against targeted regulatory inputs.
//! The run summarises each input, retrieves context once, composes the
//! prompt with relevant learnings, asks the generator for JSON, repairs and
//! parses it, and saves the result as the new active analysis.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::errors::AnalysisError;
use super::support::{ingest_pending, retrieve_all, summarise_inputs};
use crate::application::{RunStatus, Workspace};
use crate::config::AnalysisConfig;
use crate::domain::analysis::{parse_gap_review, AnalysisResult, AnalysisType, SavedAnalysis};
use crate::domain::documents::{CompanyDocument, DocumentRef, RegulatoryInput};
use crate::domain::foundation::{AnalysisId, DocumentId, Timestamp};
use crate::domain::learning::{extract_all, select_for_prompt};
use crate::domain::prompt::compose_gap_review;
use crate::ports::{GenerationRequest, Generator, IngestDocument, Ingestor, Retriever, StateStore};

/// Command to run a Gap Review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunGapReviewCommand {
    pub regulatory_ids: Vec<DocumentId>,
    pub company_ids: Vec<DocumentId>,
}

impl RunGapReviewCommand {
    pub fn new(regulatory_ids: Vec<DocumentId>, company_ids: Vec<DocumentId>) -> Self {
        Self {
            regulatory_ids,
            company_ids,
        }
    }

    /// Builds the command from the workspace's current selection.
    pub fn from_selection(workspace: &Workspace) -> Self {
        let (regulatory, company) = workspace.gap_review_selection();
        Self::new(regulatory.to_vec(), company.to_vec())
    }
}

/// Result of a successful Gap Review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunGapReviewResult {
    pub analysis_id: AnalysisId,
    pub suggestion_count: usize,
    pub action_count: usize,
    pub learnings_applied: usize,
    /// Summaries replaced by a placeholder.
    pub failed_summaries: usize,
    pub chunks_retrieved: usize,
}

/// Handler for RunGapReview commands.
pub struct RunGapReviewHandler {
    generator: Arc<dyn Generator>,
    retriever: Arc<dyn Retriever>,
    ingestor: Arc<dyn Ingestor>,
    state_store: Arc<dyn StateStore>,
    config: AnalysisConfig,
}

impl RunGapReviewHandler {
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
        cmd: RunGapReviewCommand,
        workspace: &mut Workspace,
    ) -> Result<RunGapReviewResult, AnalysisError> {
        if workspace.status(AnalysisType::GapReview).is_loading() {
            return Err(AnalysisError::run_in_progress(AnalysisType::GapReview));
        }

        // 1. Validate the selection before touching any collaborator
        if cmd.regulatory_ids.is_empty() || cmd.company_ids.is_empty() {
            workspace.set_status(AnalysisType::GapReview, RunStatus::Idle);
            return Err(AnalysisError::validation(
                "Select at least one regulatory input and one company document",
            ));
        }

        let documents = resolve_documents(&cmd, workspace);
        let (regulatory, company) = match documents {
            Ok(documents) => documents,
            Err(err) => {
                workspace.set_status(AnalysisType::GapReview, RunStatus::Error(err.to_string()));
                return Err(err);
            }
        };

        info!(
            regulatory = regulatory.len(),
            company = company.len(),
            "Starting gap review"
        );

        // 2. A new run always clears the displayed result first
        workspace.set_status(AnalysisType::GapReview, RunStatus::Loading);
        workspace.analyses_mut().clear_active();

        let result = match self.run(&regulatory, &company, workspace).await {
            Ok(result) => result,
            Err(err) => {
                error!(error = %err, code = %err.code(), "Gap review failed");
                workspace.set_status(AnalysisType::GapReview, RunStatus::Error(err.to_string()));
                return Err(err);
            }
        };

        info!(
            analysis_id = %result.analysis_id,
            suggestions = result.suggestion_count,
            actions = result.action_count,
            "Gap review complete"
        );

        // 9. Persist, then report success
        if let Err(err) = workspace.persist(self.state_store.as_ref()).await {
            let err = AnalysisError::from(err);
            error!(error = %err, code = %err.code(), "Gap review could not be saved");
            workspace.set_status(AnalysisType::GapReview, RunStatus::Error(err.to_string()));
            return Err(err);
        }
        workspace.set_status(AnalysisType::GapReview, RunStatus::Success(result.analysis_id));
        Ok(result)
    }

    async fn run(
        &self,
        regulatory: &[RegulatoryInput],
        company: &[CompanyDocument],
        workspace: &mut Workspace,
    ) -> Result<RunGapReviewResult, AnalysisError> {
        let budget = self.config.prompt_budget();

        // 3. Best-effort ingestion of anything not yet indexed
        let pending: Vec<IngestDocument> = regulatory
            .iter()
            .filter(|i| !i.is_processed_for_rag)
            .map(IngestDocument::from)
            .chain(
                company
                    .iter()
                    .filter(|d| !d.is_processed_for_rag)
                    .map(IngestDocument::from),
            )
            .collect();
        ingest_pending(self.ingestor.as_ref(), workspace, pending).await;

        // 4. Summarise each regulatory input; failures become placeholders
        let (summaries, failed_summaries) =
            summarise_inputs(self.generator.as_ref(), regulatory, &budget).await;

        // 5. One retrieval for the whole review
        let query = gap_review_query(regulatory, company);
        let chunks =
            retrieve_all(self.retriever.as_ref(), &query, self.config.gap_review_top_k).await?;

        // 6. Learnings relevant to the documents under review
        let all_learnings = extract_all(workspace.saved_analyses(), None);
        let names: Vec<&str> = company.iter().map(|d| d.name.as_str()).collect();
        let learnings = select_for_prompt(&all_learnings, &names, self.config.max_prompt_learnings);

        // 7. Compose and generate
        let regulatory_refs: Vec<DocumentRef> = regulatory.iter().map(|i| i.to_ref()).collect();
        let company_refs: Vec<DocumentRef> = company.iter().map(|d| d.to_ref()).collect();
        let prompt = compose_gap_review(
            &regulatory_refs,
            &company_refs,
            &chunks,
            &summaries,
            &learnings,
            &budget,
        );
        debug!(
            system_chars = prompt.system.len(),
            user_chars = prompt.user.len(),
            learnings = learnings.len(),
            "Gap review prompt composed"
        );

        let response = self
            .generator
            .generate(
                GenerationRequest::new(prompt.user.clone())
                    .with_system_instruction(prompt.system.clone())
                    .json(),
            )
            .await?;

        // 8. Repair and parse; a failure here is fatal and nothing is saved
        let result = parse_gap_review(&response.text).map_err(|err| {
            error!(raw = %err.raw_preview(), "Gap review output could not be parsed");
            err
        })?;

        let suggestion_count = result.suggested_changes.len();
        let action_count = result.action_plan.len();
        let learnings_applied = learnings.len();

        let now = Timestamp::now();
        let analysis = SavedAnalysis::new(
            format!("Gap Review - {}", now.display_label()),
            AnalysisResult::GapReview(result),
        )
        .with_timestamp(now)
        .with_inputs(regulatory_refs.into_iter().chain(company_refs).collect())
        .with_input_summaries(summaries)
        .with_learnings(learnings)
        .with_prompts(prompt.system, prompt.user)
        .with_grounding(response.grounding);
        let analysis_id = analysis.id;

        workspace.analyses_mut().add(analysis);
        workspace.analyses_mut().set_active(analysis_id)?;
        workspace.clear_selection();
        workspace.refresh_learnings(self.config.max_chat_learnings);

        Ok(RunGapReviewResult {
            analysis_id,
            suggestion_count,
            action_count,
            learnings_applied,
            failed_summaries,
            chunks_retrieved: chunks.len(),
        })
    }
}

type ResolvedDocuments = (Vec<RegulatoryInput>, Vec<CompanyDocument>);

fn resolve_documents(
    cmd: &RunGapReviewCommand,
    workspace: &Workspace,
) -> Result<ResolvedDocuments, AnalysisError> {
    let regulatory = cmd
        .regulatory_ids
        .iter()
        .map(|id| {
            workspace
                .regulatory_input(id)
                .cloned()
                .ok_or_else(|| AnalysisError::DocumentNotFound(id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let company = cmd
        .company_ids
        .iter()
        .map(|id| {
            workspace
                .company_document(id)
                .cloned()
                .ok_or_else(|| AnalysisError::DocumentNotFound(id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((regulatory, company))
}

fn gap_review_query(regulatory: &[RegulatoryInput], company: &[CompanyDocument]) -> String {
    let titles: Vec<&str> = regulatory.iter().map(|i| i.title.as_str()).collect();
    let names: Vec<&str> = company.iter().map(|d| d.name.as_str()).collect();
    format!(
        "Compliance gap review of company documents {} against regulatory requirements in {} (AUSTRAC AML/CTF obligations)",
        names.join(", "),
        titles.join(", ")
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockGenerator;
    use crate::adapters::ingestion::MockIngestor;
    use crate::adapters::retrieval::MockRetriever;
    use crate::adapters::storage::InMemoryStateStore;
    use crate::domain::analysis::{AnalysisResult, Priority, MISSING_TEXT};
    use crate::domain::documents::{RegulatoryInputType, RetrievedChunk, SourceKind};
    use crate::ports::{GenerationError, IngestionError, RetrievalError, StateKey};

    const OUTPUT: &str = r#"```json
{
  "suggestedChanges": [
    {
      "documentSection": "Customer Due Diligence",
      "currentStatusSummary": "No PEP screening",
      "regulatoryRelevance": "Chapter 4 of the AML/CTF Rules",
      "suggestedModification": "Add PEP screening at onboarding",
      "priority": "Urgent",
      "sourceDocumentName": "KYC Policy.pdf"
    }
    stray
    {
      "documentSection": "Record keeping",
      "priority": "Low"
    }
  ],
  "actionPlan": [
    { "task": "Update onboarding checklist", "responsible": "Compliance", "timeline": "Q1 2025", "High" }
  ]
}
```"#;

    fn id(s: &str) -> DocumentId {
        DocumentId::new(s).unwrap()
    }

    fn workspace() -> Workspace {
        let mut ws = Workspace::new();
        ws.upsert_regulatory_input(RegulatoryInput::new(
            id("r1"),
            "AML/CTF Rules",
            "Reporting entities must screen for PEPs.",
            RegulatoryInputType::Txt,
        ));
        ws.upsert_company_document(CompanyDocument::new(
            id("c1"),
            "KYC Policy.pdf",
            "We verify customer identity.",
        ));
        ws
    }

    fn chunk(doc: &str, name: &str, kind: SourceKind) -> RetrievedChunk {
        RetrievedChunk::new(format!("{}-1", doc), id(doc), name, kind, "passage")
    }

    struct Fixture {
        generator: MockGenerator,
        retriever: MockRetriever,
        ingestor: MockIngestor,
        store: InMemoryStateStore,
    }

    impl Fixture {
        fn new(generator: MockGenerator) -> Self {
            Self {
                generator,
                retriever: MockRetriever::new().with_corpus(vec![
                    chunk("r1", "AML/CTF Rules", SourceKind::Regulatory),
                    chunk("c1", "KYC Policy.pdf", SourceKind::Company),
                ]),
                ingestor: MockIngestor::new(),
                store: InMemoryStateStore::new(),
            }
        }

        fn handler(&self) -> RunGapReviewHandler {
            RunGapReviewHandler::new(
                Arc::new(self.generator.clone()),
                Arc::new(self.retriever.clone()),
                Arc::new(self.ingestor.clone()),
                Arc::new(self.store.clone()),
                AnalysisConfig::default(),
            )
        }
    }

    fn command() -> RunGapReviewCommand {
        RunGapReviewCommand::new(vec![id("r1")], vec![id("c1")])
    }

    mod validation {
        use super::*;

        #[tokio::test]
        async fn empty_company_selection_makes_no_calls() {
            let fixture = Fixture::new(MockGenerator::new());
            let mut ws = workspace();

            let err = fixture
                .handler()
                .handle(RunGapReviewCommand::new(vec![id("r1")], vec![]), &mut ws)
                .await
                .unwrap_err();

            assert!(matches!(err, AnalysisError::Validation(_)));
            assert_eq!(fixture.generator.call_count(), 0);
            assert_eq!(fixture.retriever.call_count(), 0);
            assert_eq!(fixture.ingestor.call_count(), 0);
            assert_eq!(ws.status(AnalysisType::GapReview), &RunStatus::Idle);
        }

        #[tokio::test]
        async fn empty_regulatory_selection_fails() {
            let fixture = Fixture::new(MockGenerator::new());
            let mut ws = workspace();

            let result = fixture
                .handler()
                .handle(RunGapReviewCommand::new(vec![], vec![id("c1")]), &mut ws)
                .await;

            assert!(matches!(result, Err(AnalysisError::Validation(_))));
            assert_eq!(fixture.generator.call_count(), 0);
        }

        #[tokio::test]
        async fn unknown_document_is_reported() {
            let fixture = Fixture::new(MockGenerator::new());
            let mut ws = workspace();

            let err = fixture
                .handler()
                .handle(RunGapReviewCommand::new(vec![id("r1")], vec![id("nope")]), &mut ws)
                .await
                .unwrap_err();

            assert!(matches!(err, AnalysisError::DocumentNotFound(ref d) if d == &id("nope")));
            assert!(matches!(ws.status(AnalysisType::GapReview), RunStatus::Error(_)));
            assert_eq!(fixture.retriever.call_count(), 0);
        }

        #[tokio::test]
        async fn refuses_while_loading() {
            let fixture = Fixture::new(MockGenerator::new());
            let mut ws = workspace();
            ws.set_status(AnalysisType::GapReview, RunStatus::Loading);

            let err = fixture.handler().handle(command(), &mut ws).await.unwrap_err();

            assert!(matches!(err, AnalysisError::RunInProgress(_)));
        }
    }

    mod successful_run {
        use super::*;

        fn generator() -> MockGenerator {
            MockGenerator::new()
                .with_response_matching("Summarise", "Entities must screen PEPs.")
                .with_response(OUTPUT)
        }

        #[tokio::test]
        async fn saves_repaired_and_normalised_result() {
            let fixture = Fixture::new(generator());
            let mut ws = workspace();

            let result = fixture.handler().handle(command(), &mut ws).await.unwrap();

            assert_eq!(result.suggestion_count, 2);
            assert_eq!(result.action_count, 1);
            assert_eq!(result.failed_summaries, 0);

            let saved = ws.analyses().get(result.analysis_id).unwrap();
            assert!(saved.name.starts_with("Gap Review - "));
            let AnalysisResult::GapReview(review) = &saved.result else {
                panic!("expected a gap review");
            };
            assert_eq!(review.suggested_changes[0].priority, Priority::Medium);
            assert_eq!(review.suggested_changes[1].current_status_summary, MISSING_TEXT);
            assert_ne!(review.suggested_changes[0].id, review.suggested_changes[1].id);
            assert_eq!(review.action_plan[0].priority_level, Priority::High);
            assert_eq!(saved.input_summaries[0].summary, "Entities must screen PEPs.");
        }

        #[tokio::test]
        async fn marks_active_clears_selection_and_persists() {
            let fixture = Fixture::new(generator());
            let mut ws = workspace();
            ws.select_for_gap_review(vec![id("r1")], vec![id("c1")]);

            let result = fixture
                .handler()
                .handle(RunGapReviewCommand::from_selection(&ws), &mut ws)
                .await
                .unwrap();

            assert_eq!(ws.analyses().active_id(), Some(result.analysis_id));
            assert_eq!(
                ws.status(AnalysisType::GapReview),
                &RunStatus::Success(result.analysis_id)
            );
            let (regulatory, company) = ws.gap_review_selection();
            assert!(regulatory.is_empty() && company.is_empty());
            assert!(fixture.store.contains(StateKey::SavedAnalyses).await);
            assert!(fixture.store.contains(StateKey::ActiveAnalysisId).await);
        }

        #[tokio::test]
        async fn calls_collaborators_in_expected_shape() {
            let fixture = Fixture::new(generator());
            let mut ws = workspace();

            fixture.handler().handle(command(), &mut ws).await.unwrap();

            // One summary plus the analysis itself
            assert_eq!(fixture.generator.call_count(), 2);
            let analysis_call = fixture.generator.last_call().unwrap();
            assert!(analysis_call.json_mode);
            assert!(!analysis_call.web_search);

            let retrievals = fixture.retriever.get_calls();
            assert_eq!(retrievals.len(), 1);
            assert_eq!(retrievals[0].top_k, 15);
            assert!(retrievals[0].query.contains("KYC Policy.pdf"));

            assert_eq!(fixture.ingestor.call_count(), 2);
            assert!(ws.company_documents()[0].is_processed_for_rag);
            assert!(ws.regulatory_inputs()[0].is_processed_for_rag);
        }

        #[tokio::test]
        async fn processed_documents_are_not_reingested() {
            let fixture = Fixture::new(generator());
            let mut ws = workspace();
            ws.mark_processed(SourceKind::Company, &id("c1"));
            ws.mark_processed(SourceKind::Regulatory, &id("r1"));

            fixture.handler().handle(command(), &mut ws).await.unwrap();

            assert_eq!(fixture.ingestor.call_count(), 0);
        }
    }

    mod partial_failures {
        use super::*;

        #[tokio::test]
        async fn failed_summary_becomes_placeholder() {
            let fixture = Fixture::new(
                MockGenerator::new()
                    .with_error_matching("Summarise", GenerationError::unavailable("busy"))
                    .with_response(r#"{"suggestedChanges": [], "actionPlan": []}"#),
            );
            let mut ws = workspace();

            let result = fixture.handler().handle(command(), &mut ws).await.unwrap();

            assert_eq!(result.failed_summaries, 1);
            let saved = ws.analyses().get(result.analysis_id).unwrap();
            assert_eq!(
                saved.input_summaries[0].summary,
                "Summary unavailable for \"AML/CTF Rules\"."
            );
        }

        #[tokio::test]
        async fn failed_ingestion_does_not_block_the_run() {
            let mut fixture = Fixture::new(
                MockGenerator::new()
                    .with_response_matching("Summarise", "summary")
                    .with_response(r#"{"suggestedChanges": [], "actionPlan": []}"#),
            );
            fixture.ingestor = MockIngestor::new()
                .with_error_for(id("c1"), IngestionError::Unavailable("offline".into()));
            let mut ws = workspace();

            let result = fixture.handler().handle(command(), &mut ws).await;

            assert!(result.is_ok());
            assert!(!ws.company_documents()[0].is_processed_for_rag);
            assert!(ws.regulatory_inputs()[0].is_processed_for_rag);
        }
    }

    mod fatal_failures {
        use super::*;

        #[tokio::test]
        async fn unparseable_output_saves_nothing() {
            let fixture = Fixture::new(
                MockGenerator::new()
                    .with_response_matching("Summarise", "summary")
                    .with_response("I could not produce JSON today."),
            );
            let mut ws = workspace();

            let err = fixture.handler().handle(command(), &mut ws).await.unwrap_err();

            assert!(matches!(err, AnalysisError::Parse { ref raw, .. } if raw.contains("could not")));
            assert!(ws.analyses().is_empty());
            assert!(matches!(ws.status(AnalysisType::GapReview), RunStatus::Error(_)));
            assert!(!fixture.store.contains(StateKey::SavedAnalyses).await);
        }

        #[tokio::test]
        async fn retrieval_failure_is_run_level() {
            let mut fixture = Fixture::new(MockGenerator::new());
            fixture.retriever = MockRetriever::new().with_error(RetrievalError::unavailable("down"));
            let mut ws = workspace();

            let err = fixture.handler().handle(command(), &mut ws).await.unwrap_err();

            assert!(matches!(err, AnalysisError::Retrieval(_)));
            assert!(ws.analyses().is_empty());
        }

        #[tokio::test]
        async fn storage_failure_reports_error_status() {
            let mut fixture = Fixture::new(
                MockGenerator::new()
                    .with_response_matching("Summarise", "summary")
                    .with_response(r#"{"suggestedChanges": [], "actionPlan": []}"#),
            );
            fixture.store = InMemoryStateStore::new().with_failing_writes();
            let mut ws = workspace();

            let err = fixture.handler().handle(command(), &mut ws).await.unwrap_err();

            assert!(matches!(err, AnalysisError::Storage(_)));
            assert!(matches!(ws.status(AnalysisType::GapReview), RunStatus::Error(_)));
        }

        #[tokio::test]
        async fn new_run_clears_previous_active_even_when_failing() {
            let fixture = Fixture::new(
                MockGenerator::new()
                    .with_response_matching("Summarise", "summary")
                    .with_response(r#"{"suggestedChanges": [], "actionPlan": []}"#)
                    .with_error(GenerationError::AuthenticationFailed),
            );
            let mut ws = workspace();
            let first = fixture.handler().handle(command(), &mut ws).await.unwrap();
            assert_eq!(ws.analyses().active_id(), Some(first.analysis_id));

            let second = fixture.handler().handle(command(), &mut ws).await;

            assert!(matches!(second, Err(AnalysisError::Generation(_))));
            assert_eq!(ws.analyses().active_id(), None);
            assert_eq!(ws.analyses().len(), 1);
        }
    }
}
