//! Chat module - the conversational surface over the document corpus.

mod message;

pub use message::{ChatMessage, ChatSender, MessageId};
