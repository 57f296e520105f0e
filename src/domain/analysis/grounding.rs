//! Web-search grounding metadata returned alongside generated text.

use serde::{Deserialize, Serialize};

/// A web page the generator cited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebSource>,
}

/// Citations and search queries from a web-search-enabled generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
    #[serde(default)]
    pub web_search_queries: Vec<String>,
}

impl GroundingMetadata {
    pub fn is_empty(&self) -> bool {
        self.grounding_chunks.is_empty() && self.web_search_queries.is_empty()
    }

    /// Web sources that carry a URI, in citation order.
    pub fn web_sources(&self) -> impl Iterator<Item = &WebSource> {
        self.grounding_chunks
            .iter()
            .filter_map(|c| c.web.as_ref())
            .filter(|w| w.uri.is_some())
    }
}
