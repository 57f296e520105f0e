//! Chat prompt composition.

use super::context::{learnings_block, numbered_chunk_section};
use super::{ComposedPrompt, PromptBudget};
use crate::domain::analysis::SavedAnalysis;
use crate::domain::chat::ChatMessage;
use crate::domain::documents::RetrievedChunk;
use crate::domain::foundation::truncate_with_ellipsis;

const PERSONA: &str = "You are Vera, a compliance assistant. Answer questions using the retrieved \
passages from the user's uploaded company documents and regulatory inputs. Cite passages with their \
number in square brackets, e.g. [1]. If the retrieved context does not contain the answer, say that \
you could not find it in the provided documents before offering any general guidance. Never invent \
document content.";

/// Suggested changes listed when describing the active analysis.
const ACTIVE_ANALYSIS_ITEMS: usize = 10;

/// Builds the chat prompts for `message`.
///
/// Only the last `budget.chat_history_window` history messages are replayed.
pub fn compose_chat(
    message: &str,
    history: &[ChatMessage],
    chunks: &[RetrievedChunk],
    learnings: &[String],
    active: Option<&SavedAnalysis>,
    budget: &PromptBudget,
) -> ComposedPrompt {
    let mut system = PERSONA.to_string();
    if let Some(analysis) = active {
        system.push_str("\n\n");
        system.push_str(&active_analysis_summary(analysis));
    }
    if let Some(block) = learnings_block(learnings) {
        system.push_str("\n\n");
        system.push_str(&block);
    }

    let context = numbered_chunk_section(chunks, budget.max_section_chars)
        .unwrap_or_else(|| "No passages were retrieved for this question.".to_string());

    let start = history.len().saturating_sub(budget.chat_history_window);
    let transcript = history[start..]
        .iter()
        .map(|m| format!("{}: {}", m.sender().label(), m.text()))
        .collect::<Vec<_>>()
        .join("\n");

    let mut user = format!("RETRIEVED CONTEXT\n{}\n\n", context);
    if !transcript.is_empty() {
        user.push_str(&format!("CHAT HISTORY\n{}\n\n", transcript));
    }
    user.push_str(&format!("USER QUESTION: {}", message.trim()));

    ComposedPrompt { system, user }
}

fn active_analysis_summary(analysis: &SavedAnalysis) -> String {
    let changes = analysis.result.suggested_changes();
    let mut out = format!(
        "The user is currently viewing the {} analysis \"{}\" with {} suggested changes and {} action items.",
        analysis.analysis_type().label(),
        analysis.name,
        changes.len(),
        analysis.result.action_plan().len(),
    );
    for change in changes.iter().take(ACTIVE_ANALYSIS_ITEMS) {
        out.push_str(&format!(
            "\n- [{}] {}: {}",
            change.priority,
            change.document_section,
            truncate_with_ellipsis(&change.suggested_modification, 200)
        ));
    }
    out
}
