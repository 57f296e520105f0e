//! Analysis tuning: retrieval sizes, learning caps and prompt budgets

use serde::Deserialize;

use super::error::ConfigValidationError;
use crate::domain::prompt::PromptBudget;

/// Analysis configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub gap_review_top_k: usize,
    pub deep_dive_legislative_top_k: usize,
    pub deep_dive_cross_reference_top_k: usize,
    pub chat_top_k: usize,
    pub max_prompt_learnings: usize,
    pub max_chat_learnings: usize,
    pub max_section_chars: usize,
    pub max_document_chars: usize,
    pub max_summary_input_chars: usize,
    pub chat_history_window: usize,
}

impl AnalysisConfig {
    /// Prompt size limits derived from this configuration
    pub fn prompt_budget(&self) -> PromptBudget {
        PromptBudget {
            max_section_chars: self.max_section_chars,
            max_document_chars: self.max_document_chars,
            max_summary_input_chars: self.max_summary_input_chars,
            chat_history_window: self.chat_history_window,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let checks = [
            ("ANALYSIS__GAP_REVIEW_TOP_K", self.gap_review_top_k),
            ("ANALYSIS__DEEP_DIVE_LEGISLATIVE_TOP_K", self.deep_dive_legislative_top_k),
            (
                "ANALYSIS__DEEP_DIVE_CROSS_REFERENCE_TOP_K",
                self.deep_dive_cross_reference_top_k,
            ),
            ("ANALYSIS__CHAT_TOP_K", self.chat_top_k),
            ("ANALYSIS__MAX_SECTION_CHARS", self.max_section_chars),
            ("ANALYSIS__MAX_DOCUMENT_CHARS", self.max_document_chars),
            ("ANALYSIS__MAX_SUMMARY_INPUT_CHARS", self.max_summary_input_chars),
        ];

        match checks.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ConfigValidationError::MustBeNonZero(name)),
            None => Ok(()),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let budget = PromptBudget::default();
        Self {
            gap_review_top_k: 15,
            deep_dive_legislative_top_k: 10,
            deep_dive_cross_reference_top_k: 5,
            chat_top_k: 8,
            max_prompt_learnings: 7,
            max_chat_learnings: 10,
            max_section_chars: budget.max_section_chars,
            max_document_chars: budget.max_document_chars,
            max_summary_input_chars: budget.max_summary_input_chars,
            chat_history_window: budget.chat_history_window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_prompt_budget() {
        let config = AnalysisConfig::default();
        assert_eq!(config.prompt_budget(), PromptBudget::default());
        assert_eq!(config.gap_review_top_k, 15);
        assert_eq!(config.max_prompt_learnings, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let config = AnalysisConfig {
            chat_top_k: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::MustBeNonZero("ANALYSIS__CHAT_TOP_K"))
        );
    }

    #[test]
    fn zero_learning_caps_are_allowed() {
        let config = AnalysisConfig {
            max_prompt_learnings: 0,
            max_chat_learnings: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
