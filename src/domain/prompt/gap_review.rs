//! Gap Review prompt composition.

use super::context::{chunk_section, learnings_block};
use super::{ComposedPrompt, PromptBudget};
use crate::domain::documents::{DocumentRef, InputSummary, RetrievedChunk, SourceKind};
use crate::domain::foundation::DocumentId;

const SYSTEM_FRAMING: &str = "You are an expert compliance analyst for an Australian financial services \
organisation regulated by AUSTRAC, with working knowledge of the AML/CTF Act and Rules, ASIC and APRA \
requirements. Compare the organisation's internal documents against the targeted regulatory inputs, \
identify concrete compliance gaps and propose specific, actionable changes to the internal documents. \
Prioritise gaps that could lead to regulatory action as High. Respond with a single JSON object and \
nothing else.";

const OUTPUT_SCHEMA: &str = r#"Return a single JSON object with exactly this structure:
{
  "suggestedChanges": [
    {
      "documentSection": "section or clause of the company document",
      "currentStatusSummary": "what the document currently says or omits",
      "regulatoryRelevance": "the regulatory requirement involved",
      "suggestedModification": "the specific change to make",
      "priority": "High | Medium | Low",
      "sourceDocumentName": "exact name of the company document the change applies to",
      "basisOfSuggestion": "Legislation | Regulatory Guidance | General Knowledge"
    }
  ],
  "actionPlan": [
    {
      "task": "action needed to implement the changes",
      "responsible": "role or team",
      "timeline": "suggested timeframe",
      "priorityLevel": "High | Medium | Low"
    }
  ]
}"#;

/// Builds the Gap Review prompts.
///
/// Only chunks of the right kind whose source is among the targeted ids reach
/// the prompt. When no regulatory chunk survives, the input summaries stand
/// in; when no company chunk survives, the document names do.
pub fn compose_gap_review(
    targeted_regulatory: &[DocumentRef],
    targeted_company: &[DocumentRef],
    chunks: &[RetrievedChunk],
    summaries: &[InputSummary],
    learnings: &[String],
    budget: &PromptBudget,
) -> ComposedPrompt {
    let mut system = SYSTEM_FRAMING.to_string();
    if let Some(block) = learnings_block(learnings) {
        system.push_str("\n\n");
        system.push_str(&block);
    }

    let regulatory_ids = ids(targeted_regulatory);
    let company_ids = ids(targeted_company);
    let company_names: Vec<&str> = targeted_company.iter().map(|d| d.name.as_str()).collect();

    let regulatory_section = chunk_section(
        chunks
            .iter()
            .filter(|c| c.belongs_to(SourceKind::Regulatory, &regulatory_ids)),
        budget.max_section_chars,
    )
    .unwrap_or_else(|| regulatory_fallback(targeted_regulatory, summaries));

    let company_section = chunk_section(
        chunks
            .iter()
            .filter(|c| c.belongs_to(SourceKind::Company, &company_ids)),
        budget.max_section_chars,
    )
    .unwrap_or_else(|| company_fallback(&company_names));

    let user = format!(
        "REGULATORY CONTEXT\n{}\n\nCOMPANY DOCUMENT CONTEXT\n{}\n\nCompany documents under review: {}\n\n{}\n\
         Every suggested change MUST include \"sourceDocumentName\" set to the exact name of one of the \
         company documents under review, so results can be grouped by document.",
        regulatory_section.trim_end(),
        company_section.trim_end(),
        company_names.join(", "),
        OUTPUT_SCHEMA,
    );

    ComposedPrompt { system, user }
}

fn ids(refs: &[DocumentRef]) -> Vec<DocumentId> {
    refs.iter().map(|r| r.id.clone()).collect()
}

fn regulatory_fallback(targeted: &[DocumentRef], summaries: &[InputSummary]) -> String {
    let mut out = String::from(
        "No passages were retrieved from the targeted regulatory inputs. Use these summaries instead:\n",
    );
    if summaries.is_empty() {
        for input in targeted {
            out.push_str(&format!("- {}\n", input.name));
        }
    } else {
        for s in summaries {
            out.push_str(&format!("- {}: {}\n", s.title, s.summary.trim()));
        }
    }
    out
}

fn company_fallback(names: &[&str]) -> String {
    let mut out = String::from(
        "No passages were retrieved from the company documents. Base the review on these documents:\n",
    );
    for name in names {
        out.push_str(&format!("- {}\n", name));
    }
    out
}
