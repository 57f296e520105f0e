//! Generator Port - Interface for large-language-model text generation.
//!
//! The analysis workflows, summaries, chat and draft generation all go
//! through this port so that the model vendor can be swapped or mocked.
//!
//! # Example
//!
//! ```ignore
//! let request = GenerationRequest::new(prompt.user)
//!     .with_system_instruction(prompt.system)
//!     .json();
//! let response = generator.generate(request).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::analysis::GroundingMetadata;

/// Port for text generation.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generates text for a single prompt.
    async fn generate(&self, request: GenerationRequest)
        -> Result<GenerationResponse, GenerationError>;

    /// Name and model of the backing service.
    fn generator_info(&self) -> GeneratorInfo;
}

/// Request for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
    /// Ask the model for a JSON response.
    pub json_mode: bool,
    /// Allow the model to ground its answer in public web search.
    pub web_search: bool,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_instruction: None,
            json_mode: false,
            web_search: false,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Requests JSON output.
    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }

    /// Enables web search grounding.
    pub fn with_web_search(mut self) -> Self {
        self.web_search = true;
        self
    }
}

/// Generated text plus any web grounding that came with it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResponse {
    pub text: String,
    pub grounding: Option<GroundingMetadata>,
}

impl GenerationResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            grounding: None,
        }
    }

    pub fn with_grounding(mut self, grounding: GroundingMetadata) -> Self {
        self.grounding = Some(grounding);
        self
    }
}

/// Generator identity, for logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorInfo {
    pub name: String,
    pub model: String,
}

impl GeneratorInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Generator errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// The model refused or the response was blocked.
    #[error("content blocked: {reason}")]
    ContentBlocked { reason: String },

    #[error("generator unavailable: {message}")]
    Unavailable { message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("generator returned no text")]
    EmptyResponse,

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl GenerationError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn content_blocked(reason: impl Into<String>) -> Self {
        Self::ContentBlocked {
            reason: reason.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::RateLimited { .. }
                | GenerationError::Unavailable { .. }
                | GenerationError::Network(_)
                | GenerationError::Timeout { .. }
        )
    }
}
