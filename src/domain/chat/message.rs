//! Chat messages exchanged with the assistant.
//!
//! Messages are immutable once recorded. Assistant replies may carry the web
//! grounding and the retrieved chunks they were produced from.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::analysis::GroundingMetadata;
use crate::domain::documents::RetrievedChunk;
use crate::domain::foundation::{Timestamp, ValidationError};

/// Unique identifier for a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    User,
    Bot,
}

impl ChatSender {
    /// Label used when replaying history into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            ChatSender::User => "user",
            ChatSender::Bot => "bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    id: MessageId,
    sender: ChatSender,
    text: String,
    timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    grounding_metadata: Option<GroundingMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    retrieved_context: Vec<RetrievedChunk>,
}

impl ChatMessage {
    /// Creates a user message.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the text is blank
    pub fn user(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::empty_field("message"));
        }
        Ok(Self {
            id: MessageId::new(),
            sender: ChatSender::User,
            text,
            timestamp: Timestamp::now(),
            grounding_metadata: None,
            retrieved_context: Vec::new(),
        })
    }

    /// Creates an assistant reply.
    pub fn bot(
        text: impl Into<String>,
        grounding: Option<GroundingMetadata>,
        retrieved_context: Vec<RetrievedChunk>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            sender: ChatSender::Bot,
            text: text.into(),
            timestamp: Timestamp::now(),
            grounding_metadata: grounding.filter(|g| !g.is_empty()),
            retrieved_context,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn sender(&self) -> ChatSender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn grounding_metadata(&self) -> Option<&GroundingMetadata> {
        self.grounding_metadata.as_ref()
    }

    pub fn retrieved_context(&self) -> &[RetrievedChunk] {
        &self.retrieved_context
    }

    pub fn is_user(&self) -> bool {
        self.sender == ChatSender::User
    }
}
