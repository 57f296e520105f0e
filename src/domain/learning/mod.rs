//! Learning module - reusable context distilled from user feedback.
//!
//! A learning is a formatted sentence describing one piece of feedback. It is
//! never stored on its own: the full set is recomputed from saved analyses and
//! then narrowed for the chat or for a new analysis prompt.

mod extractor;
mod selection;

pub use extractor::{extract_all, format_learning, learning_tag};
pub use selection::{
    section_fragment, select_for_chat, select_for_prompt, DEFAULT_MAX_CHAT_LEARNINGS,
    DEFAULT_MAX_PROMPT_LEARNINGS,
};
