//! Uploaded documents and the lightweight references analyses keep to them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{DocumentId, Timestamp};

/// Which corpus a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Internal company document (policy, procedure, register).
    Company,
    /// Regulatory or legislative text.
    Regulatory,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Company => write!(f, "company"),
            SourceKind::Regulatory => write!(f, "regulatory"),
        }
    }
}

/// An internal company document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDocument {
    pub id: DocumentId,
    pub name: String,
    /// MIME type or extension reported at upload.
    #[serde(rename = "type")]
    pub content_type: String,
    pub text_content: String,
    /// Last-modified time reported by the uploader, in epoch milliseconds.
    pub last_modified: i64,
    pub size: u64,
    #[serde(default)]
    pub is_processed_for_rag: bool,
}

impl CompanyDocument {
    /// Creates a document from extracted text. Size is the UTF-8 byte length.
    pub fn new(id: DocumentId, name: impl Into<String>, text_content: impl Into<String>) -> Self {
        let text_content = text_content.into();
        Self {
            id,
            name: name.into(),
            content_type: "text/plain".to_string(),
            size: text_content.len() as u64,
            text_content,
            last_modified: Timestamp::now().as_datetime().timestamp_millis(),
            is_processed_for_rag: false,
        }
    }

    pub fn to_ref(&self) -> DocumentRef {
        DocumentRef {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: SourceKind::Company,
        }
    }
}

/// How a regulatory input was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegulatoryInputType {
    Pdf,
    Txt,
    Pasted,
}

/// A regulatory text: legislation, regulator guidance or an update notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegulatoryInput {
    pub id: DocumentId,
    pub title: String,
    pub raw_content: String,
    #[serde(rename = "type")]
    pub input_type: RegulatoryInputType,
    pub date_added: Timestamp,
    #[serde(default)]
    pub is_processed_for_rag: bool,
}

impl RegulatoryInput {
    pub fn new(
        id: DocumentId,
        title: impl Into<String>,
        raw_content: impl Into<String>,
        input_type: RegulatoryInputType,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            raw_content: raw_content.into(),
            input_type,
            date_added: Timestamp::now(),
            is_processed_for_rag: false,
        }
    }

    pub fn to_ref(&self) -> DocumentRef {
        DocumentRef {
            id: self.id.clone(),
            name: self.title.clone(),
            kind: SourceKind::Regulatory,
        }
    }
}

/// Id, name and kind of a document. Analyses snapshot these, never content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub id: DocumentId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
}

/// Generator-written summary of a regulatory input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSummary {
    pub title: String,
    pub summary: String,
}

impl InputSummary {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_id(s: &str) -> DocumentId {
        DocumentId::new(s).unwrap()
    }

    #[test]
    fn company_document_size_is_byte_length() {
        let doc = CompanyDocument::new(doc_id("c1"), "Policy A.pdf", "héllo");
        assert_eq!(doc.size, 6);
        assert!(!doc.is_processed_for_rag);
    }

    #[test]
    fn refs_carry_kind() {
        let doc = CompanyDocument::new(doc_id("c1"), "Policy A.pdf", "text");
        let reg = RegulatoryInput::new(doc_id("r1"), "AML Rules", "text", RegulatoryInputType::Txt);

        assert_eq!(doc.to_ref().kind, SourceKind::Company);
        assert_eq!(reg.to_ref().kind, SourceKind::Regulatory);
        assert_eq!(reg.to_ref().name, "AML Rules");
    }

    #[test]
    fn company_document_uses_camel_case_json() {
        let doc = CompanyDocument::new(doc_id("c1"), "Policy A.pdf", "text");
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["textContent"], "text");
        assert_eq!(json["type"], "text/plain");
        assert_eq!(json["isProcessedForRag"], false);
    }

    #[test]
    fn regulatory_input_defaults_processed_flag_when_absent() {
        let json = r#"{
            "id": "r1",
            "title": "Guidance Note",
            "rawContent": "Body",
            "type": "pasted",
            "dateAdded": "2024-01-15T10:30:00Z"
        }"#;
        let input: RegulatoryInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.input_type, RegulatoryInputType::Pasted);
        assert!(!input.is_processed_for_rag);
    }

    #[test]
    fn source_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SourceKind::Regulatory).unwrap(), "\"regulatory\"");
        assert_eq!(SourceKind::Company.to_string(), "company");
    }
}
