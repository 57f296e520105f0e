//! Workspace - the session state every handler works against.
//!
//! Owns both document corpora, the analysis store, the chat history and the
//! cached learnings. Handlers borrow it mutably for the length of one
//! command, so there is never more than one logical writer.
//!
//! Persistence goes through a [`StateStore`]: each collection is written as
//! its own JSON blob, and an empty collection deletes its key.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::analysis::{AnalysisStore, AnalysisType, SavedAnalysis};
use crate::domain::chat::ChatMessage;
use crate::domain::documents::{CompanyDocument, RegulatoryInput, SourceKind};
use crate::domain::foundation::{AnalysisId, DocumentId};
use crate::domain::learning::extract_all;
use crate::ports::{StateKey, StateStore, StateStoreError};

/// Lifecycle of one workflow type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RunStatus {
    #[default]
    Idle,
    Loading,
    Success(AnalysisId),
    Error(String),
}

impl RunStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, RunStatus::Loading)
    }
}

/// Session state: corpora, analyses, chat and learnings.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    company_documents: Vec<CompanyDocument>,
    regulatory_inputs: Vec<RegulatoryInput>,
    analyses: AnalysisStore,
    chat_history: Vec<ChatMessage>,
    learnings_cache: Vec<String>,
    gap_review_status: RunStatus,
    deep_dive_status: RunStatus,
    selected_regulatory: Vec<DocumentId>,
    selected_company: Vec<DocumentId>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Corpora
    // ═══════════════════════════════════════════════════════════════════════

    /// Adds or replaces (by id) a company document.
    pub fn upsert_company_document(&mut self, document: CompanyDocument) {
        match self.company_documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document,
            None => self.company_documents.push(document),
        }
    }

    /// Adds or replaces (by id) a regulatory input.
    pub fn upsert_regulatory_input(&mut self, input: RegulatoryInput) {
        match self.regulatory_inputs.iter_mut().find(|i| i.id == input.id) {
            Some(existing) => *existing = input,
            None => self.regulatory_inputs.push(input),
        }
    }

    pub fn remove_company_document(&mut self, id: &DocumentId) -> bool {
        let before = self.company_documents.len();
        self.company_documents.retain(|d| &d.id != id);
        self.selected_company.retain(|s| s != id);
        before != self.company_documents.len()
    }

    pub fn remove_regulatory_input(&mut self, id: &DocumentId) -> bool {
        let before = self.regulatory_inputs.len();
        self.regulatory_inputs.retain(|i| &i.id != id);
        self.selected_regulatory.retain(|s| s != id);
        before != self.regulatory_inputs.len()
    }

    pub fn company_documents(&self) -> &[CompanyDocument] {
        &self.company_documents
    }

    pub fn regulatory_inputs(&self) -> &[RegulatoryInput] {
        &self.regulatory_inputs
    }

    pub fn company_document(&self, id: &DocumentId) -> Option<&CompanyDocument> {
        self.company_documents.iter().find(|d| &d.id == id)
    }

    pub fn regulatory_input(&self, id: &DocumentId) -> Option<&RegulatoryInput> {
        self.regulatory_inputs.iter().find(|i| &i.id == id)
    }

    pub fn company_document_by_name(&self, name: &str) -> Option<&CompanyDocument> {
        let name = name.trim();
        self.company_documents.iter().find(|d| d.name == name)
    }

    /// Records that a document has been sent to the retrieval index.
    pub fn mark_processed(&mut self, kind: SourceKind, id: &DocumentId) {
        match kind {
            SourceKind::Company => {
                if let Some(doc) = self.company_documents.iter_mut().find(|d| &d.id == id) {
                    doc.is_processed_for_rag = true;
                }
            }
            SourceKind::Regulatory => {
                if let Some(input) = self.regulatory_inputs.iter_mut().find(|i| &i.id == id) {
                    input.is_processed_for_rag = true;
                }
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Gap Review selection
    // ═══════════════════════════════════════════════════════════════════════

    pub fn select_for_gap_review(
        &mut self,
        regulatory: Vec<DocumentId>,
        company: Vec<DocumentId>,
    ) {
        self.selected_regulatory = regulatory;
        self.selected_company = company;
    }

    /// Currently selected `(regulatory, company)` ids.
    pub fn gap_review_selection(&self) -> (&[DocumentId], &[DocumentId]) {
        (&self.selected_regulatory, &self.selected_company)
    }

    pub fn clear_selection(&mut self) {
        self.selected_regulatory.clear();
        self.selected_company.clear();
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Analyses and run status
    // ═══════════════════════════════════════════════════════════════════════

    pub fn analyses(&self) -> &AnalysisStore {
        &self.analyses
    }

    pub fn analyses_mut(&mut self) -> &mut AnalysisStore {
        &mut self.analyses
    }

    pub fn status(&self, analysis_type: AnalysisType) -> &RunStatus {
        match analysis_type {
            AnalysisType::GapReview => &self.gap_review_status,
            AnalysisType::DeepDive => &self.deep_dive_status,
        }
    }

    /// Also used to reset a status left at `Loading` by an abandoned run.
    pub fn set_status(&mut self, analysis_type: AnalysisType, status: RunStatus) {
        match analysis_type {
            AnalysisType::GapReview => self.gap_review_status = status,
            AnalysisType::DeepDive => self.deep_dive_status = status,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Chat and learnings
    // ═══════════════════════════════════════════════════════════════════════

    pub fn chat_history(&self) -> &[ChatMessage] {
        &self.chat_history
    }

    pub fn push_chat_turn(&mut self, question: ChatMessage, answer: ChatMessage) {
        self.chat_history.push(question);
        self.chat_history.push(answer);
    }

    pub fn clear_chat(&mut self) {
        self.chat_history.clear();
    }

    /// Cached general learnings, newest analysis first.
    pub fn learnings(&self) -> &[String] {
        &self.learnings_cache
    }

    /// Recomputes the learnings cache from the analysis store.
    pub fn refresh_learnings(&mut self, max_count: usize) {
        self.learnings_cache = extract_all(self.analyses.list_all(), Some(max_count));
    }

    /// Snapshot of every saved analysis, for learning extraction.
    pub fn saved_analyses(&self) -> &[SavedAnalysis] {
        self.analyses.list_all()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Persistence
    // ═══════════════════════════════════════════════════════════════════════

    /// Rebuilds a workspace from `store`. Absent keys load as empty.
    pub async fn load(store: &dyn StateStore) -> Result<Self, StateStoreError> {
        let company_documents = load_key(store, StateKey::CompanyDocuments).await?;
        let regulatory_inputs = load_key(store, StateKey::RegulatoryInputs).await?;
        let analyses: Option<Vec<SavedAnalysis>> = load_key(store, StateKey::SavedAnalyses).await?;
        let active_id: Option<AnalysisId> = load_key(store, StateKey::ActiveAnalysisId).await?;
        let chat_history = load_key(store, StateKey::ChatHistory).await?;
        let learnings_cache = load_key(store, StateKey::LearningsCache).await?;

        let workspace = Self {
            company_documents: company_documents.unwrap_or_default(),
            regulatory_inputs: regulatory_inputs.unwrap_or_default(),
            analyses: AnalysisStore::from_parts(analyses.unwrap_or_default(), active_id),
            chat_history: chat_history.unwrap_or_default(),
            learnings_cache: learnings_cache.unwrap_or_default(),
            ..Self::default()
        };

        tracing::debug!(
            analyses = workspace.analyses.len(),
            company_documents = workspace.company_documents.len(),
            regulatory_inputs = workspace.regulatory_inputs.len(),
            "Workspace loaded"
        );

        Ok(workspace)
    }

    /// Writes every collection to `store`, deleting keys for empty ones.
    pub async fn persist(&self, store: &dyn StateStore) -> Result<(), StateStoreError> {
        save_list(store, StateKey::CompanyDocuments, &self.company_documents).await?;
        save_list(store, StateKey::RegulatoryInputs, &self.regulatory_inputs).await?;
        save_list(store, StateKey::SavedAnalyses, self.analyses.list_all()).await?;
        save_list(store, StateKey::ChatHistory, &self.chat_history).await?;
        save_list(store, StateKey::LearningsCache, &self.learnings_cache).await?;

        match self.analyses.active_id() {
            Some(id) => save_blob(store, StateKey::ActiveAnalysisId, &id).await,
            None => store.remove(StateKey::ActiveAnalysisId).await,
        }
    }
}

async fn load_key<T: DeserializeOwned>(
    store: &dyn StateStore,
    key: StateKey,
) -> Result<Option<T>, StateStoreError> {
    let Some(blob) = store.load(key).await? else {
        return Ok(None);
    };

    serde_json::from_str(&blob)
        .map(Some)
        .map_err(|e| StateStoreError::DeserializationFailed {
            key,
            message: e.to_string(),
        })
}

async fn save_list<T: Serialize>(
    store: &dyn StateStore,
    key: StateKey,
    items: &[T],
) -> Result<(), StateStoreError> {
    if items.is_empty() {
        return store.remove(key).await;
    }
    save_blob(store, key, items).await
}

async fn save_blob<T: Serialize + ?Sized>(
    store: &dyn StateStore,
    key: StateKey,
    value: &T,
) -> Result<(), StateStoreError> {
    let blob = serde_json::to_string(value).map_err(|e| StateStoreError::SerializationFailed {
        key,
        message: e.to_string(),
    })?;
    store.save(key, blob).await
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryStateStore;
    use crate::domain::analysis::{AnalysisResult, GapReviewResult};
    use crate::domain::documents::RegulatoryInputType;

    fn doc(id: &str) -> CompanyDocument {
        CompanyDocument::new(DocumentId::new(id).unwrap(), format!("{}.pdf", id), "body")
    }

    fn input(id: &str) -> RegulatoryInput {
        RegulatoryInput::new(
            DocumentId::new(id).unwrap(),
            format!("Rule {}", id),
            "text",
            RegulatoryInputType::Txt,
        )
    }

    fn analysis(name: &str) -> SavedAnalysis {
        SavedAnalysis::new(name, AnalysisResult::GapReview(GapReviewResult::default()))
    }

    mod corpora {
        use super::*;

        #[test]
        fn upsert_replaces_by_id() {
            let mut ws = Workspace::new();
            ws.upsert_company_document(doc("a"));
            let mut updated = doc("a");
            updated.text_content = "new body".to_string();
            ws.upsert_company_document(updated);

            assert_eq!(ws.company_documents().len(), 1);
            assert_eq!(ws.company_documents()[0].text_content, "new body");
        }

        #[test]
        fn removing_a_document_drops_it_from_the_selection() {
            let mut ws = Workspace::new();
            ws.upsert_company_document(doc("a"));
            ws.upsert_regulatory_input(input("r"));
            ws.select_for_gap_review(
                vec![DocumentId::new("r").unwrap()],
                vec![DocumentId::new("a").unwrap()],
            );

            assert!(ws.remove_company_document(&DocumentId::new("a").unwrap()));
            assert!(!ws.remove_company_document(&DocumentId::new("a").unwrap()));

            let (regulatory, company) = ws.gap_review_selection();
            assert_eq!(regulatory.len(), 1);
            assert!(company.is_empty());
        }

        #[test]
        fn mark_processed_sets_flag_for_right_corpus() {
            let mut ws = Workspace::new();
            ws.upsert_company_document(doc("a"));
            ws.upsert_regulatory_input(input("a"));

            ws.mark_processed(SourceKind::Regulatory, &DocumentId::new("a").unwrap());

            assert!(!ws.company_documents()[0].is_processed_for_rag);
            assert!(ws.regulatory_inputs()[0].is_processed_for_rag);
        }
    }

    mod status {
        use super::*;

        #[test]
        fn statuses_are_tracked_per_type() {
            let mut ws = Workspace::new();
            ws.set_status(AnalysisType::GapReview, RunStatus::Loading);

            assert!(ws.status(AnalysisType::GapReview).is_loading());
            assert_eq!(ws.status(AnalysisType::DeepDive), &RunStatus::Idle);
        }
    }

    mod persistence {
        use super::*;

        #[tokio::test]
        async fn round_trips_through_store() {
            let store = InMemoryStateStore::new();
            let mut ws = Workspace::new();
            ws.upsert_company_document(doc("a"));
            ws.upsert_regulatory_input(input("r"));
            let saved = analysis("Gap Review - first");
            let id = saved.id;
            ws.analyses_mut().add(saved);
            ws.analyses_mut().set_active(id).unwrap();
            ws.push_chat_turn(
                ChatMessage::user("hello").unwrap(),
                ChatMessage::bot("hi", None, vec![]),
            );

            ws.persist(&store).await.unwrap();
            let loaded = Workspace::load(&store).await.unwrap();

            assert_eq!(loaded.company_documents(), ws.company_documents());
            assert_eq!(loaded.regulatory_inputs(), ws.regulatory_inputs());
            assert_eq!(loaded.analyses().active_id(), Some(id));
            assert!(loaded.analyses().active_view().is_some());
            assert_eq!(loaded.chat_history().len(), 2);
        }

        #[tokio::test]
        async fn empty_collections_delete_their_keys() {
            let store = InMemoryStateStore::new();
            let mut ws = Workspace::new();
            ws.upsert_company_document(doc("a"));
            let saved = analysis("x");
            let id = saved.id;
            ws.analyses_mut().add(saved);
            ws.analyses_mut().set_active(id).unwrap();
            ws.persist(&store).await.unwrap();
            assert!(store.contains(StateKey::CompanyDocuments).await);
            assert!(store.contains(StateKey::ActiveAnalysisId).await);

            ws.remove_company_document(&DocumentId::new("a").unwrap());
            ws.analyses_mut().delete(id);
            ws.persist(&store).await.unwrap();

            assert!(store.is_empty().await);
        }

        #[tokio::test]
        async fn corrupt_blob_reports_its_key() {
            let store = InMemoryStateStore::new();
            store
                .save(StateKey::SavedAnalyses, "{not json".to_string())
                .await
                .unwrap();

            let err = Workspace::load(&store).await.unwrap_err();
            assert!(matches!(
                err,
                StateStoreError::DeserializationFailed {
                    key: StateKey::SavedAnalyses,
                    ..
                }
            ));
        }
    }
}
