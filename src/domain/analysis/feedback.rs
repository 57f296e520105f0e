//! User feedback attached to suggested changes and action items.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Status label marking a suggestion the user acted on.
pub const STATUS_ACTIONED: &str = "Actioned";

/// Status label marking a suggestion the user rejected as not applicable.
pub const STATUS_NOT_APPLICABLE: &str = "Not Applicable";

/// Feedback recorded by the user against one suggestion or action item.
///
/// Overwritten in place on each update; `last_updated` moves on every write.
/// Only `final_adopted_text` survives an update that does not set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub last_updated: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_adopted_text: Option<String>,
}

/// A feedback edit. Status and notes replace the previous values outright;
/// `final_adopted_text` left as `None` keeps the adopted text already recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackUpdate {
    pub status: Option<String>,
    pub notes: Option<String>,
    pub final_adopted_text: Option<String>,
}

impl FeedbackUpdate {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Default::default()
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_adopted_text(mut self, text: impl Into<String>) -> Self {
        self.final_adopted_text = Some(text.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.notes.is_none() && self.final_adopted_text.is_none()
    }
}

impl UserFeedback {
    /// Produces the feedback that replaces `existing`, stamped with `now`.
    pub fn apply(existing: Option<&UserFeedback>, update: FeedbackUpdate, now: Timestamp) -> Self {
        let adopted = existing.and_then(|prev| prev.final_adopted_text.clone());

        Self {
            status: update.status,
            notes: update.notes,
            last_updated: now,
            final_adopted_text: update.final_adopted_text.or(adopted),
        }
    }

    /// Notes trimmed, or `None` when blank.
    pub fn trimmed_notes(&self) -> Option<&str> {
        self.notes.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// Adopted text, or `None` when blank.
    pub fn adopted_text(&self) -> Option<&str> {
        self.final_adopted_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    /// Whether this feedback carries enough signal to become a learning.
    ///
    /// Qualifies when the status is `Actioned`, when adopted text exists, or
    /// when the status is `Not Applicable` and the user explained why.
    pub fn qualifies_as_learning(&self) -> bool {
        let status = self.status.as_deref();
        status == Some(STATUS_ACTIONED)
            || self.adopted_text().is_some()
            || (status == Some(STATUS_NOT_APPLICABLE) && self.trimmed_notes().is_some())
    }
}
