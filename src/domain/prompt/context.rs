//! Rendering helpers shared by the composers.

use crate::domain::documents::RetrievedChunk;
use crate::domain::foundation::truncate_with_ellipsis;

/// Renders chunks as labelled passages, in the order given, until the next
/// passage would push the section past `max_chars`.
///
/// If even the first passage is too long it is cut to fit, so a non-empty
/// input never renders to nothing. Returns `None` for no chunks.
pub(crate) fn chunk_section<'a, I>(chunks: I, max_chars: usize) -> Option<String>
where
    I: IntoIterator<Item = &'a RetrievedChunk>,
{
    let mut section = String::new();
    let mut used = 0;

    for chunk in chunks {
        let passage = format!(
            "--- Source: {} ---\n{}\n",
            chunk.source_document_name,
            chunk.text.trim()
        );
        let len = passage.chars().count();

        if used + len > max_chars {
            if section.is_empty() {
                section = truncate_with_ellipsis(&passage, max_chars);
            }
            break;
        }
        section.push_str(&passage);
        used += len;
    }

    (!section.is_empty()).then_some(section)
}

/// Renders chunks as `[n]` numbered passages for citation.
pub(crate) fn numbered_chunk_section(chunks: &[RetrievedChunk], max_chars: usize) -> Option<String> {
    let mut section = String::new();
    let mut used = 0;

    for (idx, chunk) in chunks.iter().enumerate() {
        let passage = format!(
            "[{}] {} ({}):\n{}\n\n",
            idx + 1,
            chunk.source_document_name,
            chunk.source_document_type,
            chunk.text.trim()
        );
        let len = passage.chars().count();
        if used + len > max_chars {
            break;
        }
        section.push_str(&passage);
        used += len;
    }

    (!section.is_empty()).then(|| section.trim_end().to_string())
}

/// The learnings block appended to a system prompt. `None` when there are
/// no learnings.
pub(crate) fn learnings_block(learnings: &[String]) -> Option<String> {
    if learnings.is_empty() {
        return None;
    }
    let mut block = String::from(
        "LEARNINGS FROM PREVIOUS USER FEEDBACK\n\
         Past reviewers gave the feedback below. Follow their preferences and adopted wording where they apply:\n",
    );
    for learning in learnings {
        block.push_str("- ");
        block.push_str(learning);
        block.push('\n');
    }
    Some(block)
}
