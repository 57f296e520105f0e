//! Analysis result shapes, tagged by analysis type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{ActionPlanItem, SuggestedChange};

/// Group name for suggestions that do not name a source document.
pub const DEFAULT_GROUP: &str = "General";

/// The two kinds of analysis the assistant runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisType {
    GapReview,
    DeepDive,
}

impl AnalysisType {
    /// Label used in analysis names and learning tags.
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisType::GapReview => "Gap Review",
            AnalysisType::DeepDive => "Deep Dive",
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of comparing a document set against targeted regulatory inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapReviewResult {
    pub suggested_changes: Vec<SuggestedChange>,
    pub action_plan: Vec<ActionPlanItem>,
}

impl GapReviewResult {
    /// Suggested changes grouped by source document name.
    ///
    /// Derived from `suggested_changes` on every call, so it can never drift
    /// from the flat list. Suggestions without a source land in `General`.
    pub fn grouped_suggestions(&self) -> BTreeMap<&str, Vec<&SuggestedChange>> {
        let mut groups: BTreeMap<&str, Vec<&SuggestedChange>> = BTreeMap::new();
        for change in &self.suggested_changes {
            let key = change
                .source_document_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(DEFAULT_GROUP);
            groups.entry(key).or_default().push(change);
        }
        groups
    }
}

/// Result of auditing a single document against broad regulatory context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepDiveResult {
    pub document_title_analyzed: String,
    pub overall_summary: String,
    pub key_themes_and_topics: Vec<String>,
    pub suggested_changes: Vec<SuggestedChange>,
    pub action_plan: Vec<ActionPlanItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_observations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_regulatory_inputs: Option<Vec<String>>,
}

/// Analysis output, one variant per analysis type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AnalysisResult {
    GapReview(GapReviewResult),
    DeepDive(DeepDiveResult),
}

/// Fields to shallow-merge into an existing result. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPatch {
    pub suggested_changes: Option<Vec<SuggestedChange>>,
    pub action_plan: Option<Vec<ActionPlanItem>>,
    /// Only meaningful for deep dives; ignored for gap reviews.
    pub additional_observations: Option<String>,
}

impl ResultPatch {
    pub fn is_empty(&self) -> bool {
        self.suggested_changes.is_none()
            && self.action_plan.is_none()
            && self.additional_observations.is_none()
    }
}

impl AnalysisResult {
    pub fn analysis_type(&self) -> AnalysisType {
        match self {
            AnalysisResult::GapReview(_) => AnalysisType::GapReview,
            AnalysisResult::DeepDive(_) => AnalysisType::DeepDive,
        }
    }

    pub fn suggested_changes(&self) -> &[SuggestedChange] {
        match self {
            AnalysisResult::GapReview(r) => &r.suggested_changes,
            AnalysisResult::DeepDive(r) => &r.suggested_changes,
        }
    }

    pub fn action_plan(&self) -> &[ActionPlanItem] {
        match self {
            AnalysisResult::GapReview(r) => &r.action_plan,
            AnalysisResult::DeepDive(r) => &r.action_plan,
        }
    }

    /// Replaces every field present in `patch`, leaving the rest untouched.
    pub fn merge(&mut self, patch: ResultPatch) {
        let ResultPatch {
            suggested_changes,
            action_plan,
            additional_observations,
        } = patch;

        match self {
            AnalysisResult::GapReview(r) => {
                if let Some(changes) = suggested_changes {
                    r.suggested_changes = changes;
                }
                if let Some(plan) = action_plan {
                    r.action_plan = plan;
                }
            }
            AnalysisResult::DeepDive(r) => {
                if let Some(changes) = suggested_changes {
                    r.suggested_changes = changes;
                }
                if let Some(plan) = action_plan {
                    r.action_plan = plan;
                }
                if let Some(observations) = additional_observations {
                    r.additional_observations = Some(observations);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::Priority;
    use crate::domain::foundation::{ActionItemId, SuggestionId};

    fn change(section: &str, source: Option<&str>) -> SuggestedChange {
        SuggestedChange {
            id: SuggestionId::new(),
            document_section: section.to_string(),
            current_status_summary: "N/A".to_string(),
            regulatory_relevance: "N/A".to_string(),
            suggested_modification: "N/A".to_string(),
            priority: Priority::Medium,
            source_document_name: source.map(String::from),
            basis_of_suggestion: None,
            web_reference_keywords: None,
            user_feedback: None,
        }
    }

    fn action(task: &str) -> ActionPlanItem {
        ActionPlanItem {
            id: ActionItemId::new(),
            task: task.to_string(),
            responsible: "Compliance".to_string(),
            timeline: "Q1".to_string(),
            priority_level: Priority::High,
            basis_of_suggestion: None,
            user_feedback: None,
        }
    }

    #[test]
    fn grouping_partitions_every_suggestion() {
        let result = GapReviewResult {
            suggested_changes: vec![
                change("1", Some("Policy A.pdf")),
                change("2", Some("Policy B.pdf")),
                change("3", Some("Policy A.pdf")),
                change("4", None),
                change("5", Some("  ")),
            ],
            action_plan: vec![],
        };

        let groups = result.grouped_suggestions();
        let total: usize = groups.values().map(Vec::len).sum();

        assert_eq!(total, result.suggested_changes.len());
        assert_eq!(groups["Policy A.pdf"].len(), 2);
        assert_eq!(groups["Policy B.pdf"].len(), 1);
        assert_eq!(groups[DEFAULT_GROUP].len(), 2);
    }

    #[test]
    fn grouping_follows_changes_to_flat_list() {
        let mut result = AnalysisResult::GapReview(GapReviewResult {
            suggested_changes: vec![change("1", Some("A"))],
            action_plan: vec![],
        });

        result.merge(ResultPatch {
            suggested_changes: Some(vec![change("1", Some("B")), change("2", Some("B"))]),
            ..Default::default()
        });

        let AnalysisResult::GapReview(r) = &result else {
            panic!("expected gap review");
        };
        let groups = r.grouped_suggestions();
        assert!(!groups.contains_key("A"));
        assert_eq!(groups["B"].len(), 2);
    }

    #[test]
    fn merge_keeps_fields_absent_from_patch() {
        let mut result = AnalysisResult::DeepDive(DeepDiveResult {
            document_title_analyzed: "Policy".to_string(),
            overall_summary: "Summary".to_string(),
            key_themes_and_topics: vec!["KYC".to_string()],
            suggested_changes: vec![change("1", None)],
            action_plan: vec![action("old")],
            additional_observations: Some("obs".to_string()),
            referenced_regulatory_inputs: None,
        });

        result.merge(ResultPatch {
            action_plan: Some(vec![action("new")]),
            ..Default::default()
        });

        assert_eq!(result.suggested_changes().len(), 1);
        assert_eq!(result.action_plan()[0].task, "new");
        let AnalysisResult::DeepDive(r) = &result else {
            panic!("expected deep dive");
        };
        assert_eq!(r.overall_summary, "Summary");
        assert_eq!(r.additional_observations.as_deref(), Some("obs"));
    }

    #[test]
    fn result_serializes_with_type_tag() {
        let result = AnalysisResult::GapReview(GapReviewResult::default());
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["type"], "gapReview");
        assert!(json["suggestedChanges"].is_array());

        let back: AnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.analysis_type(), AnalysisType::GapReview);
    }

    #[test]
    fn analysis_type_labels() {
        assert_eq!(AnalysisType::GapReview.label(), "Gap Review");
        assert_eq!(AnalysisType::DeepDive.to_string(), "Deep Dive");
    }
}
