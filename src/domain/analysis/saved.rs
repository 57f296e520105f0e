//! Persisted analysis record.

use serde::{Deserialize, Serialize};

use super::{AnalysisResult, AnalysisType, GroundingMetadata};
use crate::domain::documents::{DocumentRef, InputSummary};
use crate::domain::foundation::{AnalysisId, Timestamp};

/// One successful analysis run, kept in the analysis store.
///
/// Immutable apart from rename, feedback merges into `result`, and deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAnalysis {
    pub id: AnalysisId,
    pub name: String,
    pub timestamp: Timestamp,
    pub result: AnalysisResult,
    /// Documents the run targeted. References only, never content.
    #[serde(default)]
    pub inputs_used: Vec<DocumentRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_summaries: Vec<InputSummary>,
    #[serde(default)]
    pub learnings_applied: Vec<String>,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub user_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_metadata: Option<GroundingMetadata>,
}

impl SavedAnalysis {
    pub fn new(name: impl Into<String>, result: AnalysisResult) -> Self {
        Self {
            id: AnalysisId::new(),
            name: name.into(),
            timestamp: Timestamp::now(),
            result,
            inputs_used: Vec::new(),
            input_summaries: Vec::new(),
            learnings_applied: Vec::new(),
            system_prompt: String::new(),
            user_prompt: String::new(),
            grounding_metadata: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_inputs(mut self, inputs: Vec<DocumentRef>) -> Self {
        self.inputs_used = inputs;
        self
    }

    pub fn with_input_summaries(mut self, summaries: Vec<InputSummary>) -> Self {
        self.input_summaries = summaries;
        self
    }

    pub fn with_learnings(mut self, learnings: Vec<String>) -> Self {
        self.learnings_applied = learnings;
        self
    }

    pub fn with_prompts(mut self, system: impl Into<String>, user: impl Into<String>) -> Self {
        self.system_prompt = system.into();
        self.user_prompt = user.into();
        self
    }

    /// Stores grounding only when it carries something.
    pub fn with_grounding(mut self, grounding: Option<GroundingMetadata>) -> Self {
        self.grounding_metadata = grounding.filter(|g| !g.is_empty());
        self
    }

    pub fn analysis_type(&self) -> AnalysisType {
        self.result.analysis_type()
    }
}
