//! Gemini Generator - Implementation of Generator for Google's Generative
//! Language REST API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-1.5-pro")
//!     .with_timeout(Duration::from_secs(60));
//!
//! let generator = GeminiGenerator::new(config)?;
//! ```
//!
//! # Web search
//!
//! When a request enables web search the `googleSearch` tool is attached
//! and JSON mode is dropped, since the API rejects the combination. The
//! grounding metadata of the first candidate is passed back to the caller.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::analysis::GroundingMetadata;
use crate::ports::{
    GenerationError, GenerationRequest, GenerationResponse, Generator, GeneratorInfo,
};

/// Configuration for the Gemini generator.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    api_key: Secret<String>,
    /// Model to use (e.g., "gemini-1.5-flash").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 3,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini REST generator.
pub struct GeminiGenerator {
    config: GeminiConfig,
    client: Client,
}

impl GeminiGenerator {
    /// Creates a generator, failing if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Converts our request to Gemini's format.
    fn to_gemini_request(request: &GenerationRequest) -> GeminiRequest {
        let system_instruction = request.system_instruction.as_ref().map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart { text: text.clone() }],
        });

        let (generation_config, tools) = if request.web_search {
            (None, Some(vec![GeminiTool::default()]))
        } else if request.json_mode {
            (
                Some(GenerationConfig {
                    response_mime_type: "application/json".to_string(),
                }),
                None,
            )
        } else {
            (None, None)
        };

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            system_instruction,
            generation_config,
            tools,
        }
    }

    async fn send_request(&self, request: &GenerationRequest) -> Result<Response, GenerationError> {
        let body = Self::to_gemini_request(request);

        self.client
            .post(self.generate_url())
            .query(&[("key", self.config.api_key())])
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    GenerationError::network(format!("Connection failed: {}", e))
                } else {
                    GenerationError::network(e.to_string())
                }
            })
    }

    /// Maps non-success statuses onto generation errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, GenerationError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(GenerationError::AuthenticationFailed),
            429 => Err(GenerationError::rate_limited(Self::parse_retry_after(
                &error_body,
            ))),
            400 => Err(GenerationError::InvalidRequest(error_body)),
            500..=599 => Err(GenerationError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(GenerationError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Reads the `retryDelay` hint ("17s") from a 429 body, defaulting to 30.
    fn parse_retry_after(error_body: &str) -> u32 {
        let parsed = match serde_json::from_str::<serde_json::Value>(error_body) {
            Ok(value) => value,
            Err(_) => return 30,
        };

        parsed
            .pointer("/error/details")
            .and_then(|d| d.as_array())
            .into_iter()
            .flatten()
            .filter_map(|detail| detail.get("retryDelay").and_then(|r| r.as_str()))
            .filter_map(|delay| delay.trim_end_matches('s').parse::<f64>().ok())
            .map(|secs| secs.ceil() as u32)
            .next()
            .unwrap_or(30)
    }

    async fn parse_response(&self, response: Response) -> Result<GenerationResponse, GenerationError> {
        let response = self.handle_response_status(response).await?;

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::parse(format!("Failed to parse response: {}", e)))?;

        extract_response(body)
    }
}

/// Pulls text and grounding out of a decoded response body.
fn extract_response(body: GeminiResponse) -> Result<GenerationResponse, GenerationError> {
    if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GenerationError::content_blocked(reason));
    }

    let candidate = body
        .candidates
        .into_iter()
        .next()
        .ok_or(GenerationError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return match candidate.finish_reason.as_deref() {
            Some(reason @ ("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")) => {
                Err(GenerationError::content_blocked(reason))
            }
            _ => Err(GenerationError::EmptyResponse),
        };
    }

    let response = GenerationResponse::text(text);
    Ok(match candidate.grounding_metadata {
        Some(grounding) if !grounding.is_empty() => response.with_grounding(grounding),
        _ => response,
    })
}

/// Longest exponential backoff step, in seconds.
const MAX_BACKOFF_SECS: u64 = 32;

/// The server's `retryDelay` for rate limits, else 1s, 2s, 4s, ... capped.
fn backoff_delay(err: &GenerationError, retry_count: u32) -> Duration {
    match err {
        GenerationError::RateLimited { retry_after_secs } => {
            Duration::from_secs(u64::from(*retry_after_secs))
        }
        _ => Duration::from_secs(
            1u64.checked_shl(retry_count)
                .unwrap_or(MAX_BACKOFF_SECS)
                .min(MAX_BACKOFF_SECS),
        ),
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let mut last_error = GenerationError::network("No attempts made");
        let mut retry_count = 0;

        while retry_count <= self.config.max_retries {
            let attempt = match self.send_request(&request).await {
                Ok(response) => self.parse_response(response).await,
                Err(err) => Err(err),
            };

            match attempt {
                Ok(response) => return Ok(response),
                Err(err) => {
                    if !err.is_retryable() || retry_count >= self.config.max_retries {
                        return Err(err);
                    }
                    tracing::warn!(
                        model = %self.config.model,
                        attempt = retry_count + 1,
                        error = %err,
                        "Gemini request failed, retrying"
                    );
                    last_error = err;
                }
            }

            sleep(backoff_delay(&last_error, retry_count)).await;
            retry_count += 1;
        }

        Err(last_error)
    }

    fn generator_info(&self) -> GeneratorInfo {
        GeneratorInfo::new("gemini", &self.config.model)
    }
}

// ----- Gemini API Types -----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    google_search: EmptyObject,
}

#[derive(Debug, Default, Serialize)]
struct EmptyObject {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn body_of(request: &GenerationRequest) -> Value {
        serde_json::to_value(GeminiGenerator::to_gemini_request(request)).unwrap()
    }

    fn decode(value: Value) -> GeminiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn backoff_doubles_then_caps() {
        let err = GenerationError::network("reset");

        assert_eq!(backoff_delay(&err, 0), Duration::from_secs(1));
        assert_eq!(backoff_delay(&err, 2), Duration::from_secs(4));
        assert_eq!(backoff_delay(&err, 9), Duration::from_secs(MAX_BACKOFF_SECS));
        assert_eq!(backoff_delay(&err, 70), Duration::from_secs(MAX_BACKOFF_SECS));
    }

    #[test]
    fn backoff_honours_rate_limit_hint() {
        let err = GenerationError::rate_limited(17);
        assert_eq!(backoff_delay(&err, 0), Duration::from_secs(17));
    }

    #[test]
    fn config_builder_works() {
        let config = GeminiConfig::new("test-key")
            .with_model("gemini-1.5-pro")
            .with_base_url("https://proxy.local/v1")
            .with_timeout(Duration::from_secs(30))
            .with_max_retries(5);

        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.base_url, "https://proxy.local/v1");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn url_names_the_model() {
        let generator =
            GeminiGenerator::new(GeminiConfig::new("k").with_base_url("https://x.test/v1beta/"))
                .unwrap();
        assert_eq!(
            generator.generate_url(),
            "https://x.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(generator.generator_info().name, "gemini");
    }

    mod request_body {
        use super::*;

        #[test]
        fn json_mode_sets_mime_type() {
            let body = body_of(
                &GenerationRequest::new("analyse")
                    .with_system_instruction("be precise")
                    .json(),
            );

            assert_eq!(body["contents"][0]["role"], "user");
            assert_eq!(body["contents"][0]["parts"][0]["text"], "analyse");
            assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be precise");
            assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
            assert!(body.get("tools").is_none());
        }

        #[test]
        fn web_search_attaches_tool_and_drops_json_mode() {
            let body = body_of(&GenerationRequest::new("q").json().with_web_search());

            assert_eq!(body["tools"], json!([{ "googleSearch": {} }]));
            assert!(body.get("generationConfig").is_none());
        }

        #[test]
        fn plain_request_has_only_contents() {
            let body = body_of(&GenerationRequest::new("hello"));
            assert_eq!(body.as_object().unwrap().len(), 1);
        }
    }

    mod response_parsing {
        use super::*;

        #[test]
        fn concatenates_parts() {
            let response = extract_response(decode(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] },
                    "finishReason": "STOP"
                }]
            })))
            .unwrap();

            assert_eq!(response.text, "{\"a\":1}");
            assert!(response.grounding.is_none());
        }

        #[test]
        fn keeps_grounding_metadata() {
            let response = extract_response(decode(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "answer" }] },
                    "groundingMetadata": {
                        "webSearchQueries": ["AML/CTF rules"],
                        "groundingChunks": [{ "web": { "uri": "https://austrac.gov.au", "title": "AUSTRAC" } }]
                    }
                }]
            })))
            .unwrap();

            let grounding = response.grounding.unwrap();
            assert_eq!(grounding.web_search_queries, vec!["AML/CTF rules"]);
            assert_eq!(grounding.web_sources().count(), 1);
        }

        #[test]
        fn blocked_prompt_is_content_blocked() {
            let err = extract_response(decode(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .unwrap_err();

            assert_eq!(err, GenerationError::content_blocked("SAFETY"));
        }

        #[test]
        fn safety_finish_without_text_is_content_blocked() {
            let err = extract_response(decode(json!({
                "candidates": [{ "finishReason": "SAFETY" }]
            })))
            .unwrap_err();

            assert!(matches!(err, GenerationError::ContentBlocked { .. }));
        }

        #[test]
        fn no_candidates_is_empty_response() {
            let err = extract_response(decode(json!({ "candidates": [] }))).unwrap_err();
            assert_eq!(err, GenerationError::EmptyResponse);
        }
    }

    #[test]
    fn parse_retry_after_from_details() {
        let body = r#"{"error":{"code":429,"details":[{"@type":"type.googleapis.com/google.rpc.RetryInfo","retryDelay":"17s"}]}}"#;
        assert_eq!(GeminiGenerator::parse_retry_after(body), 17);
    }

    #[test]
    fn parse_retry_after_default() {
        assert_eq!(GeminiGenerator::parse_retry_after("not json"), 30);
        assert_eq!(
            GeminiGenerator::parse_retry_after(r#"{"error":{"message":"slow down"}}"#),
            30
        );
    }
}
