//! Generator configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ConfigValidationError;
use crate::adapters::ai::GeminiConfig;

/// Upper bound on `max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Gemini API key; only required when the Gemini generator is built
    pub gemini_api_key: Option<String>,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// REST base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_gemini_key(&self) -> bool {
        self.gemini_api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate generator configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.model.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired("AI__MODEL"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigValidationError::TooManyRetries {
                got: self.max_retries,
                max: MAX_RETRIES_LIMIT,
            });
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigValidationError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(())
    }

    /// Builds the Gemini adapter configuration. Fails without an API key.
    pub fn gemini_config(&self) -> Result<GeminiConfig, ConfigValidationError> {
        let key = self
            .gemini_api_key
            .as_ref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigValidationError::MissingRequired("AI__GEMINI_API_KEY"))?;

        Ok(GeminiConfig::new(key.clone())
            .with_model(&self.model)
            .with_base_url(&self.base_url)
            .with_timeout(self.timeout())
            .with_max_retries(self.max_retries))
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_retries() -> u32 {
    3
}
