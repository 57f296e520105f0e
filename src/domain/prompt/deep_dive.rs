//! Deep Dive prompt composition.

use super::context::{chunk_section, learnings_block};
use super::{ComposedPrompt, PromptBudget};
use crate::domain::documents::{CompanyDocument, RetrievedChunk, SourceKind};
use crate::domain::foundation::truncate_with_ellipsis;

const SYSTEM_FRAMING: &str = "You are an expert compliance auditor for an Australian financial services \
organisation regulated by AUSTRAC. Audit the single internal document you are given against the \
legislative and regulatory context provided and against the organisation's related documents. Where \
the retrieved context is insufficient, you may rely on your general knowledge of Australian financial \
services regulation and on public web sources; mark such suggestions with a basisOfSuggestion of \
\"General Knowledge\" or \"Web Search\". Respond with a single JSON object and nothing else.";

/// Regulatory document names found in `legislative`, first occurrence first.
pub fn referenced_regulatory_inputs(legislative: &[RetrievedChunk]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for chunk in legislative {
        if chunk.source_document_type == SourceKind::Regulatory
            && !names.contains(&chunk.source_document_name)
        {
            names.push(chunk.source_document_name.clone());
        }
    }
    names
}

/// Builds the Deep Dive prompts for `target`.
///
/// Cross-reference chunks taken from the target itself are dropped.
pub fn compose_deep_dive(
    target: &CompanyDocument,
    legislative: &[RetrievedChunk],
    cross_reference: &[RetrievedChunk],
    learnings: &[String],
    budget: &PromptBudget,
) -> ComposedPrompt {
    let referenced = referenced_regulatory_inputs(legislative);

    let mut system = format!("{}\n\n{}", SYSTEM_FRAMING, output_schema(&target.name, &referenced));
    if let Some(block) = learnings_block(learnings) {
        system.push_str("\n\n");
        system.push_str(&block);
    }

    let legislative_section = chunk_section(
        legislative
            .iter()
            .filter(|c| c.source_document_type == SourceKind::Regulatory),
        budget.max_section_chars,
    )
    .unwrap_or_else(|| {
        "No legislative passages were retrieved. Rely on general knowledge of the applicable \
         regulation."
            .to_string()
    });

    let cross_section = chunk_section(
        cross_reference.iter().filter(|c| {
            c.source_document_type == SourceKind::Company && c.source_document_id != target.id
        }),
        budget.max_section_chars,
    )
    .unwrap_or_else(|| "No related company documents were retrieved.".to_string());

    let user = format!(
        "DOCUMENT UNDER REVIEW: {}\n\n{}\n\nLEGISLATIVE AND REGULATORY CONTEXT\n{}\n\n\
         RELATED COMPANY DOCUMENTS\n{}\n\nProduce the audit of \"{}\" now.",
        target.name,
        truncate_with_ellipsis(target.text_content.trim(), budget.max_document_chars),
        legislative_section.trim_end(),
        cross_section.trim_end(),
        target.name,
    );

    ComposedPrompt { system, user }
}

fn output_schema(target_name: &str, referenced: &[String]) -> String {
    let referenced_json = serde_json::to_string(referenced).unwrap_or_else(|_| "[]".to_string());
    let title_json =
        serde_json::to_string(target_name).unwrap_or_else(|_| "\"\"".to_string());

    format!(
        r#"Return a single JSON object with exactly this structure:
{{
  "documentTitleAnalyzed": {title},
  "overallSummary": "overall compliance posture of the document",
  "keyThemesAndTopics": ["theme"],
  "suggestedChanges": [
    {{
      "documentSection": "section or clause of the document",
      "currentStatusSummary": "what the document currently says or omits",
      "regulatoryRelevance": "the regulatory requirement involved",
      "suggestedModification": "the specific change to make",
      "priority": "High | Medium | Low",
      "basisOfSuggestion": "Legislation | Web Search | General Knowledge",
      "webReferenceKeywords": ["search terms for supporting public sources"]
    }}
  ],
  "actionPlan": [
    {{
      "task": "action needed",
      "responsible": "role or team",
      "timeline": "suggested timeframe",
      "priorityLevel": "High | Medium | Low"
    }}
  ],
  "additionalObservations": "anything else worth noting",
  "referencedRegulatoryInputs": {referenced}
}}"#,
        title = title_json,
        referenced = referenced_json,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::DocumentId;

    fn target() -> CompanyDocument {
        CompanyDocument::new(
            DocumentId::new("c1").unwrap(),
            "Risk Assessment.docx",
            "Our ML/TF risk assessment is reviewed annually.",
        )
    }

    fn chunk(doc_id: &str, name: &str, kind: SourceKind, text: &str) -> RetrievedChunk {
        RetrievedChunk::new(
            format!("{}-0", doc_id),
            DocumentId::new(doc_id).unwrap(),
            name,
            kind,
            text,
        )
    }

    #[test]
    fn excludes_self_from_cross_reference() {
        let cross = vec![
            chunk("c1", "Risk Assessment.docx", SourceKind::Company, "self passage"),
            chunk("c2", "Onboarding.pdf", SourceKind::Company, "other passage"),
        ];

        let prompt = compose_deep_dive(&target(), &[], &cross, &[], &PromptBudget::default());

        assert!(prompt.user.contains("other passage"));
        assert!(!prompt.user.contains("self passage"));
    }

    #[test]
    fn authorises_general_knowledge_and_lists_references() {
        let legislative = vec![
            chunk("r1", "AML/CTF Rules", SourceKind::Regulatory, "rule 1"),
            chunk("r1", "AML/CTF Rules", SourceKind::Regulatory, "rule 2"),
            chunk("r2", "AML/CTF Act", SourceKind::Regulatory, "section 36"),
        ];

        let prompt =
            compose_deep_dive(&target(), &legislative, &[], &[], &PromptBudget::default());

        assert!(prompt.system.contains("general knowledge"));
        assert!(prompt.system.contains("\"documentTitleAnalyzed\": \"Risk Assessment.docx\""));
        assert!(prompt
            .system
            .contains(r#""referencedRegulatoryInputs": ["AML/CTF Rules","AML/CTF Act"]"#));
    }

    #[test]
    fn referenced_inputs_skip_company_chunks_and_duplicates() {
        let legislative = vec![
            chunk("r1", "Rules", SourceKind::Regulatory, "a"),
            chunk("c9", "Policy", SourceKind::Company, "b"),
            chunk("r1", "Rules", SourceKind::Regulatory, "c"),
        ];
        assert_eq!(referenced_regulatory_inputs(&legislative), vec!["Rules".to_string()]);
    }

    #[test]
    fn document_body_is_bounded() {
        let mut doc = target();
        doc.text_content = "x".repeat(200);
        let budget = PromptBudget {
            max_document_chars: 50,
            ..Default::default()
        };

        let prompt = compose_deep_dive(&doc, &[], &[], &[], &budget);

        assert!(prompt.user.contains(&format!("{}...", "x".repeat(50))));
        assert!(!prompt.user.contains(&"x".repeat(51)));
        assert!(prompt.user.contains("No legislative passages were retrieved"));
    }
}
