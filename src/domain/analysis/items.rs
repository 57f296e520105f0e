//! Suggested changes and action plan items.

use serde::{Deserialize, Serialize};

use super::{Priority, UserFeedback};
use crate::domain::foundation::{ActionItemId, SuggestionId};

/// A proposed modification to a company document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedChange {
    pub id: SuggestionId,
    pub document_section: String,
    pub current_status_summary: String,
    pub regulatory_relevance: String,
    pub suggested_modification: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_document_name: Option<String>,
    /// Where the suggestion comes from, e.g. "Legislation" or "General Knowledge".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basis_of_suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_reference_keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_feedback: Option<UserFeedback>,
}

/// A task in the remediation plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlanItem {
    pub id: ActionItemId,
    pub task: String,
    pub responsible: String,
    pub timeline: String,
    pub priority_level: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basis_of_suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_feedback: Option<UserFeedback>,
}
