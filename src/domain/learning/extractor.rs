//! Extraction of learnings from feedback history.

use crate::domain::analysis::{SavedAnalysis, UserFeedback};
use crate::domain::foundation::{truncate_chars, truncate_with_ellipsis};

/// Characters of the analysis name kept in a learning tag.
const TAG_NAME_CHARS: usize = 20;
const NOTE_CHARS: usize = 100;
const ADOPTED_TEXT_CHARS: usize = 750;
const MISSING_STATUS: &str = "N/A";

/// The `(<type label>: <name prefix>...)` tag that ties a learning to the
/// analysis it came from.
pub fn learning_tag(analysis: &SavedAnalysis) -> String {
    format!(
        "({}: {}...)",
        analysis.analysis_type().label(),
        truncate_chars(&analysis.name, TAG_NAME_CHARS)
    )
}

/// Renders one feedback item as a learning sentence.
pub fn format_learning(document_section: &str, tag: &str, feedback: &UserFeedback) -> String {
    let status = feedback
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(MISSING_STATUS);

    let mut learning = format!(
        "Feedback for suggestion regarding '{}' {}: User status set to '{}'.",
        document_section, tag, status
    );
    if let Some(notes) = feedback.trimmed_notes() {
        learning.push_str(&format!(
            " Note: \"{}\".",
            truncate_with_ellipsis(notes, NOTE_CHARS)
        ));
    }
    if let Some(adopted) = feedback.adopted_text() {
        learning.push_str(&format!(
            " Adopted Text: \"{}\".",
            truncate_with_ellipsis(adopted, ADOPTED_TEXT_CHARS)
        ));
    }
    learning
}

/// Scans every analysis, newest first, and formats each qualifying
/// suggestion feedback as a learning.
///
/// `max_count` is a cap on the whole scan, not per analysis.
pub fn extract_all(analyses: &[SavedAnalysis], max_count: Option<usize>) -> Vec<String> {
    let mut ordered: Vec<&SavedAnalysis> = analyses.iter().collect();
    ordered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let limit = max_count.unwrap_or(usize::MAX);
    let mut learnings = Vec::new();
    if limit == 0 {
        return learnings;
    }

    for analysis in ordered {
        let tag = learning_tag(analysis);
        for change in analysis.result.suggested_changes() {
            let Some(feedback) = change.user_feedback.as_ref() else {
                continue;
            };
            if !feedback.qualifies_as_learning() {
                continue;
            }
            learnings.push(format_learning(&change.document_section, &tag, feedback));
            if learnings.len() >= limit {
                return learnings;
            }
        }
    }
    learnings
}
