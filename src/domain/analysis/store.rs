//! In-memory history of saved analyses.
//!
//! Most recent first is the canonical order. Every mutation that touches a
//! timestamp re-sorts. The store also owns the active-analysis pointer and
//! the cached view of the active result, so deleting the active analysis
//! clears both together.

use thiserror::Error;

use super::{AnalysisResult, ResultPatch, SavedAnalysis};
use crate::domain::foundation::{AnalysisId, ErrorCode, Timestamp, ValidationError};

/// Errors from analysis store mutations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Analysis not found: {0}")]
    NotFound(AnalysisId),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl StoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::NotFound(_) => ErrorCode::AnalysisNotFound,
            StoreError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisStore {
    analyses: Vec<SavedAnalysis>,
    active_id: Option<AnalysisId>,
    active_view: Option<AnalysisResult>,
}

impl AnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from persisted state.
    ///
    /// An active id that no longer names a saved analysis is dropped.
    pub fn from_parts(analyses: Vec<SavedAnalysis>, active_id: Option<AnalysisId>) -> Self {
        let mut store = Self {
            analyses,
            active_id: None,
            active_view: None,
        };
        store.sort();
        if let Some(id) = active_id {
            // Unknown ids are ignored.
            let _ = store.set_active(id);
        }
        store
    }

    /// Prepends `analysis` and restores timestamp order.
    pub fn add(&mut self, analysis: SavedAnalysis) {
        self.analyses.insert(0, analysis);
        self.sort();
    }

    pub fn rename(&mut self, id: AnalysisId, new_name: &str) -> Result<(), StoreError> {
        let name = new_name.trim();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name").into());
        }
        let analysis = self.get_mut(id)?;
        analysis.name = name.to_string();
        Ok(())
    }

    /// Removes the analysis. Unknown ids are a no-op.
    ///
    /// Returns whether anything was removed. Deleting the active analysis
    /// clears the active pointer and the cached view.
    pub fn delete(&mut self, id: AnalysisId) -> bool {
        let before = self.analyses.len();
        self.analyses.retain(|a| a.id != id);
        let removed = self.analyses.len() != before;

        if self.active_id == Some(id) {
            self.clear_active();
        }
        removed
    }

    /// Shallow-merges `patch` into the stored result, refreshes the
    /// timestamp and re-sorts.
    pub fn merge_feedback(&mut self, id: AnalysisId, patch: ResultPatch) -> Result<(), StoreError> {
        self.merge_feedback_at(id, patch, Timestamp::now())
    }

    /// [`merge_feedback`](Self::merge_feedback) with an explicit clock.
    pub fn merge_feedback_at(
        &mut self,
        id: AnalysisId,
        patch: ResultPatch,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let analysis = self.get_mut(id)?;
        analysis.result.merge(patch);
        analysis.timestamp = now;
        let merged = analysis.result.clone();

        if self.active_id == Some(id) {
            self.active_view = Some(merged);
        }
        self.sort();
        Ok(())
    }

    pub fn get(&self, id: AnalysisId) -> Option<&SavedAnalysis> {
        self.analyses.iter().find(|a| a.id == id)
    }

    /// All analyses, most recent first.
    pub fn list_all(&self) -> &[SavedAnalysis] {
        &self.analyses
    }

    pub fn len(&self) -> usize {
        self.analyses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }

    /// Marks `id` active and caches its result for display.
    pub fn set_active(&mut self, id: AnalysisId) -> Result<(), StoreError> {
        let result = self
            .get(id)
            .map(|a| a.result.clone())
            .ok_or(StoreError::NotFound(id))?;
        self.active_id = Some(id);
        self.active_view = Some(result);
        Ok(())
    }

    pub fn clear_active(&mut self) {
        self.active_id = None;
        self.active_view = None;
    }

    pub fn active_id(&self) -> Option<AnalysisId> {
        self.active_id
    }

    pub fn active(&self) -> Option<&SavedAnalysis> {
        self.active_id.and_then(|id| self.get(id))
    }

    /// The currently displayed result, if any.
    pub fn active_view(&self) -> Option<&AnalysisResult> {
        self.active_view.as_ref()
    }

    fn get_mut(&mut self, id: AnalysisId) -> Result<&mut SavedAnalysis, StoreError> {
        self.analyses
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn sort(&mut self) {
        // Stable, so equal timestamps keep insertion order.
        self.analyses.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }
}
