//! Prompts for regulatory summaries and document redrafts.

use super::{ComposedPrompt, PromptBudget};
use crate::domain::analysis::SuggestedChange;
use crate::domain::documents::{CompanyDocument, RegulatoryInput};
use crate::domain::foundation::truncate_with_ellipsis;

const SUMMARY_SYSTEM: &str = "You summarise regulatory texts for compliance analysts. Focus on the \
obligations the text imposes, who they apply to and any deadlines. Write plain prose without headings.";

const DRAFT_SYSTEM: &str = "You are a compliance policy writer. Revise the company document so that it \
implements the suggested change. Keep the existing structure, tone and numbering, change only what the \
suggestion requires, and return only the revised document text with no commentary.";

/// Prompt asking for a short summary of one regulatory input.
pub fn compose_summary(input: &RegulatoryInput, budget: &PromptBudget) -> ComposedPrompt {
    ComposedPrompt {
        system: SUMMARY_SYSTEM.to_string(),
        user: format!(
            "Summarise the key obligations in the regulatory text titled \"{}\" in three to five sentences.\n\n{}",
            input.title,
            truncate_with_ellipsis(input.raw_content.trim(), budget.max_summary_input_chars)
        ),
    }
}

/// Prompt asking for `document` rewritten to apply `suggestion`.
pub fn compose_draft(
    document: &CompanyDocument,
    suggestion: &SuggestedChange,
    budget: &PromptBudget,
) -> ComposedPrompt {
    ComposedPrompt {
        system: DRAFT_SYSTEM.to_string(),
        user: format!(
            "DOCUMENT: {name}\n\n{body}\n\nSUGGESTED CHANGE\n\
             Section: {section}\n\
             Current status: {status}\n\
             Regulatory relevance: {relevance}\n\
             Suggested modification: {modification}\n\
             Priority: {priority}\n\n\
             Rewrite \"{name}\" to implement this change.",
            name = document.name,
            body = truncate_with_ellipsis(document.text_content.trim(), budget.max_document_chars),
            section = suggestion.document_section,
            status = suggestion.current_status_summary,
            relevance = suggestion.regulatory_relevance,
            modification = suggestion.suggested_modification,
            priority = suggestion.priority,
        ),
    }
}
