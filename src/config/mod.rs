//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `COMPLIANCE_ASSISTANT` prefix and nested values use double underscores as
//! separators. Every section has defaults, so an empty environment loads.
//!
//! # Example
//!
//! ```no_run
//! use compliance_assistant::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Persisting to {}", config.storage.data_dir.display());
//! ```

mod ai;
mod analysis;
mod error;
mod logging;
mod storage;

pub use ai::AiConfig;
pub use analysis::AnalysisConfig;
pub use error::{ConfigError, ConfigValidationError};
pub use logging::LoggingConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Generator configuration (Gemini)
    #[serde(default)]
    pub ai: AiConfig,

    /// Retrieval sizes, learning caps and prompt budgets
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Local persistence
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `COMPLIANCE_ASSISTANT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `COMPLIANCE_ASSISTANT__AI__MODEL=gemini-1.5-pro` -> `ai.model`
    /// - `COMPLIANCE_ASSISTANT__ANALYSIS__GAP_REVIEW_TOP_K=20` -> `analysis.gap_review_top_k`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("COMPLIANCE_ASSISTANT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// The Gemini API key is not required here; it is checked when the
    /// generator is built via [`AiConfig::gemini_config`].
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.ai.validate()?;
        self.analysis.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "COMPLIANCE_ASSISTANT__AI__GEMINI_API_KEY",
        "COMPLIANCE_ASSISTANT__AI__MODEL",
        "COMPLIANCE_ASSISTANT__ANALYSIS__GAP_REVIEW_TOP_K",
        "COMPLIANCE_ASSISTANT__STORAGE__DATA_DIR",
        "COMPLIANCE_ASSISTANT__LOGGING__JSON",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_defaults_from_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.ai.model, "gemini-1.5-flash");
        assert_eq!(config.analysis.gap_review_top_k, 15);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("COMPLIANCE_ASSISTANT__AI__GEMINI_API_KEY", "g-key");
        env::set_var("COMPLIANCE_ASSISTANT__AI__MODEL", "gemini-1.5-pro");
        env::set_var("COMPLIANCE_ASSISTANT__ANALYSIS__GAP_REVIEW_TOP_K", "20");
        env::set_var("COMPLIANCE_ASSISTANT__STORAGE__DATA_DIR", "/tmp/workspace");
        env::set_var("COMPLIANCE_ASSISTANT__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.ai.has_gemini_key());
        assert_eq!(config.ai.model, "gemini-1.5-pro");
        assert_eq!(config.analysis.gap_review_top_k, 20);
        assert_eq!(config.storage.data_dir.to_str(), Some("/tmp/workspace"));
        assert!(config.logging.json);
    }

    #[test]
    fn test_validate_catches_zero_budget() {
        let mut config = AppConfig::default();
        config.analysis.max_section_chars = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::MustBeNonZero(_))
        ));
    }
}
