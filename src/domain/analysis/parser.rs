//! Parsing of repaired generator output into analysis results.
//!
//! The generator is untrusted: fields may be missing, mistyped, spelled in
//! snake_case or carry priorities outside the allowed set. Everything is read
//! loosely here and coerced into the strict domain types. Ids are always
//! assigned locally.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::json_repair::{repair, RepairError};
use super::{ActionPlanItem, DeepDiveResult, GapReviewResult, Priority, SuggestedChange};
use crate::domain::foundation::{truncate_with_ellipsis, ActionItemId, SuggestionId};

/// Placeholder for text fields the generator left out.
pub const MISSING_TEXT: &str = "N/A";

/// Generator output could not be turned into a result. Fatal for the run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Failed to parse generator output: {message}")]
pub struct OutputParseError {
    pub message: String,
    /// Text exactly as the generator returned it.
    pub raw: String,
}

impl OutputParseError {
    pub fn new(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raw: raw.into(),
        }
    }

    pub fn raw_preview(&self) -> String {
        truncate_with_ellipsis(&self.raw, 500)
    }
}

impl From<RepairError> for OutputParseError {
    fn from(err: RepairError) -> Self {
        Self {
            message: err.message,
            raw: err.raw,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSuggestion {
    #[serde(alias = "document_section")]
    document_section: Option<Value>,
    #[serde(alias = "current_status_summary")]
    current_status_summary: Option<Value>,
    #[serde(
        alias = "regulatory_relevance",
        alias = "austracRelevance",
        alias = "austrac_relevance"
    )]
    regulatory_relevance: Option<Value>,
    #[serde(alias = "suggested_modification")]
    suggested_modification: Option<Value>,
    priority: Option<Value>,
    #[serde(alias = "source_document_name")]
    source_document_name: Option<Value>,
    #[serde(alias = "basis_of_suggestion")]
    basis_of_suggestion: Option<Value>,
    #[serde(alias = "web_reference_keywords")]
    web_reference_keywords: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawActionItem {
    task: Option<Value>,
    responsible: Option<Value>,
    timeline: Option<Value>,
    #[serde(alias = "priority_level", alias = "priority")]
    priority_level: Option<Value>,
    #[serde(alias = "basis_of_suggestion")]
    basis_of_suggestion: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawGapReview {
    #[serde(alias = "suggested_changes")]
    suggested_changes: Option<Vec<RawSuggestion>>,
    #[serde(alias = "action_plan")]
    action_plan: Option<Vec<RawActionItem>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawDeepDive {
    #[serde(alias = "document_title_analyzed")]
    document_title_analyzed: Option<Value>,
    #[serde(alias = "overall_summary")]
    overall_summary: Option<Value>,
    #[serde(alias = "key_themes_and_topics")]
    key_themes_and_topics: Option<Value>,
    #[serde(alias = "suggested_changes")]
    suggested_changes: Option<Vec<RawSuggestion>>,
    #[serde(alias = "action_plan")]
    action_plan: Option<Vec<RawActionItem>>,
    #[serde(alias = "additional_observations")]
    additional_observations: Option<Value>,
    #[serde(alias = "referenced_regulatory_inputs")]
    referenced_regulatory_inputs: Option<Value>,
}

/// Repairs and parses Gap Review output.
pub fn parse_gap_review(raw: &str) -> Result<GapReviewResult, OutputParseError> {
    let parsed: RawGapReview = parse_object(raw)?;

    Ok(GapReviewResult {
        suggested_changes: convert_suggestions(parsed.suggested_changes, MISSING_TEXT),
        action_plan: convert_actions(parsed.action_plan),
    })
}

/// Repairs and parses Deep Dive output for the document named `target_name`.
///
/// Suggestions without a section default to the document name. When the
/// generator omits `referencedRegulatoryInputs`, the names in `referenced`
/// are used instead.
pub fn parse_deep_dive(
    raw: &str,
    target_name: &str,
    referenced: &[String],
) -> Result<DeepDiveResult, OutputParseError> {
    let parsed: RawDeepDive = parse_object(raw)?;

    let referenced_regulatory_inputs = string_list(parsed.referenced_regulatory_inputs)
        .or_else(|| (!referenced.is_empty()).then(|| referenced.to_vec()));

    Ok(DeepDiveResult {
        document_title_analyzed: text(parsed.document_title_analyzed)
            .unwrap_or_else(|| target_name.to_string()),
        overall_summary: text_or_missing(parsed.overall_summary),
        key_themes_and_topics: string_list(parsed.key_themes_and_topics).unwrap_or_default(),
        suggested_changes: convert_suggestions(parsed.suggested_changes, target_name),
        action_plan: convert_actions(parsed.action_plan),
        additional_observations: text(parsed.additional_observations),
        referenced_regulatory_inputs,
    })
}

/// Repairs, then requires a top-level JSON object before reading `T` from it.
fn parse_object<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T, OutputParseError> {
    let repaired = repair(raw);
    let value: Value = serde_json::from_str(&repaired).map_err(|e| RepairError {
        message: e.to_string(),
        raw: raw.to_string(),
    })?;

    if !value.is_object() {
        return Err(OutputParseError::new(
            "expected a JSON object at the top level",
            raw,
        ));
    }

    serde_json::from_value(value).map_err(|e| OutputParseError::new(e.to_string(), raw))
}

fn convert_suggestions(raw: Option<Vec<RawSuggestion>>, section_fallback: &str) -> Vec<SuggestedChange> {
    raw.unwrap_or_default()
        .into_iter()
        .map(|s| SuggestedChange {
            id: SuggestionId::new(),
            document_section: text(s.document_section)
                .unwrap_or_else(|| section_fallback.to_string()),
            current_status_summary: text_or_missing(s.current_status_summary),
            regulatory_relevance: text_or_missing(s.regulatory_relevance),
            suggested_modification: text_or_missing(s.suggested_modification),
            priority: priority(s.priority),
            source_document_name: text(s.source_document_name),
            basis_of_suggestion: text(s.basis_of_suggestion),
            web_reference_keywords: string_list(s.web_reference_keywords),
            user_feedback: None,
        })
        .collect()
}

fn convert_actions(raw: Option<Vec<RawActionItem>>) -> Vec<ActionPlanItem> {
    raw.unwrap_or_default()
        .into_iter()
        .map(|a| ActionPlanItem {
            id: ActionItemId::new(),
            task: text_or_missing(a.task),
            responsible: text_or_missing(a.responsible),
            timeline: text_or_missing(a.timeline),
            priority_level: priority(a.priority_level),
            basis_of_suggestion: text(a.basis_of_suggestion),
            user_feedback: None,
        })
        .collect()
}

/// Non-blank text from a loosely typed value. Numbers and booleans are
/// rendered; anything else counts as absent.
fn text(value: Option<Value>) -> Option<String> {
    let rendered = match value? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!rendered.trim().is_empty()).then_some(rendered)
}

fn text_or_missing(value: Option<Value>) -> String {
    text(value).unwrap_or_else(|| MISSING_TEXT.to_string())
}

fn priority(value: Option<Value>) -> Priority {
    match value {
        Some(Value::String(s)) => Priority::coerce(Some(s.as_str())),
        _ => Priority::Medium,
    }
}

/// A list of strings from an array, or a comma separated string.
/// Empty results count as absent.
fn string_list(value: Option<Value>) -> Option<Vec<String>> {
    let items: Vec<String> = match value? {
        Value::Array(items) => items.into_iter().filter_map(|v| text(Some(v))).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    };
    (!items.is_empty()).then_some(items)
}
