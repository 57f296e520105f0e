//! Prompt module - turns retrieved context, summaries and learnings into
//! system and user prompts for the generator.
//!
//! Composition is pure: no retrieval or generation happens here. Every
//! context section is bounded by a [`PromptBudget`].

mod chat;
mod context;
mod deep_dive;
mod draft;
mod gap_review;

pub use chat::compose_chat;
pub use deep_dive::{compose_deep_dive, referenced_regulatory_inputs};
pub use draft::{compose_draft, compose_summary};
pub use gap_review::compose_gap_review;

/// A system instruction and the user prompt that goes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

/// Size limits applied while composing prompts. All counts are characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBudget {
    /// Upper bound on one retrieved-context section.
    pub max_section_chars: usize,
    /// Upper bound on a full document body quoted into a prompt.
    pub max_document_chars: usize,
    /// Upper bound on regulatory text sent for summarisation.
    pub max_summary_input_chars: usize,
    /// Number of most recent chat messages replayed into a chat prompt.
    pub chat_history_window: usize,
}

impl Default for PromptBudget {
    fn default() -> Self {
        Self {
            max_section_chars: 24_000,
            max_document_chars: 12_000,
            max_summary_input_chars: 8_000,
            chat_history_window: 10,
        }
    }
}
