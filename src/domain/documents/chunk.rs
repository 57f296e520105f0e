//! Retrieved chunk value object.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::SourceKind;
use crate::domain::foundation::DocumentId;

/// A scored span of source text returned by the retriever.
///
/// Produced fresh for every retrieval call and never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedChunk {
    pub id: String,
    pub source_document_id: DocumentId,
    pub source_document_name: String,
    pub source_document_type: SourceKind,
    pub text: String,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    pub char_count: usize,
    /// Retriever-assigned relevance, higher is better.
    #[serde(default)]
    pub score: f32,
}

impl RetrievedChunk {
    pub fn new(
        id: impl Into<String>,
        source_document_id: DocumentId,
        source_document_name: impl Into<String>,
        source_document_type: SourceKind,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            id: id.into(),
            source_document_id,
            source_document_name: source_document_name.into(),
            source_document_type,
            char_count: text.chars().count(),
            text,
            keywords: BTreeSet::new(),
            score: 0.0,
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// True when the chunk is of `kind` and comes from one of `ids`.
    pub fn belongs_to(&self, kind: SourceKind, ids: &[DocumentId]) -> bool {
        self.source_document_type == kind && ids.contains(&self.source_document_id)
    }
}
