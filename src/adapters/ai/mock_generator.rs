//! Mock Generator for testing.
//!
//! Provides a configurable mock implementation of the Generator port,
//! allowing workflows to be tested without calling a real model.
//!
//! # Features
//!
//! - Queued responses consumed in order
//! - Prompt-matched responses that take precedence over the queue
//! - Error injection
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let generator = MockGenerator::new()
//!     .with_response_matching("Summarise", "A short summary.")
//!     .with_response(r#"{"suggestedChanges": [], "actionPlan": []}"#);
//!
//! let response = generator.generate(request).await?;
//! assert_eq!(generator.call_count(), 1);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::analysis::GroundingMetadata;
use crate::ports::{
    GenerationError, GenerationRequest, GenerationResponse, Generator, GeneratorInfo,
};

/// A configured mock outcome.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Success {
        text: String,
        grounding: Option<GroundingMetadata>,
    },
    Error(GenerationError),
}

impl MockOutcome {
    fn into_result(self) -> Result<GenerationResponse, GenerationError> {
        match self {
            MockOutcome::Success { text, grounding } => Ok(GenerationResponse { text, grounding }),
            MockOutcome::Error(err) => Err(err),
        }
    }
}

/// Mock generator for testing.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    /// Responses consumed in order when no matcher applies.
    responses: Arc<Mutex<VecDeque<MockOutcome>>>,
    /// `(needle, outcome)` pairs; the first whose needle appears in the
    /// prompt or system instruction wins. Never consumed.
    matchers: Arc<Mutex<Vec<(String, MockOutcome)>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            matchers: Arc::new(Mutex::new(Vec::new())),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(MockOutcome::Success {
            text: text.into(),
            grounding: None,
        })
    }

    /// Adds a successful response carrying grounding metadata.
    pub fn with_grounded_response(
        self,
        text: impl Into<String>,
        grounding: GroundingMetadata,
    ) -> Self {
        self.push(MockOutcome::Success {
            text: text.into(),
            grounding: Some(grounding),
        })
    }

    /// Adds an error to the queue.
    pub fn with_error(self, error: GenerationError) -> Self {
        self.push(MockOutcome::Error(error))
    }

    /// Answers every request mentioning `needle` with `text`.
    pub fn with_response_matching(self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.push_matcher(
            needle.into(),
            MockOutcome::Success {
                text: text.into(),
                grounding: None,
            },
        )
    }

    /// Fails every request mentioning `needle` with `error`.
    pub fn with_error_matching(self, needle: impl Into<String>, error: GenerationError) -> Self {
        self.push_matcher(needle.into(), MockOutcome::Error(error))
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this generator.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the most recent call, if any.
    pub fn last_call(&self) -> Option<GenerationRequest> {
        self.calls.lock().unwrap().last().cloned()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push(self, outcome: MockOutcome) -> Self {
        self.responses.lock().unwrap().push_back(outcome);
        self
    }

    fn push_matcher(self, needle: String, outcome: MockOutcome) -> Self {
        self.matchers.lock().unwrap().push((needle, outcome));
        self
    }

    fn next_outcome(&self, request: &GenerationRequest) -> MockOutcome {
        let matched = self
            .matchers
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| {
                request.prompt.contains(needle.as_str())
                    || request
                        .system_instruction
                        .as_deref()
                        .is_some_and(|s| s.contains(needle.as_str()))
            })
            .map(|(_, outcome)| outcome.clone());

        matched.unwrap_or_else(|| {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| MockOutcome::Success {
                    text: "Mock response".to_string(),
                    grounding: None,
                })
        })
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let outcome = self.next_outcome(&request);
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        outcome.into_result()
    }

    fn generator_info(&self) -> GeneratorInfo {
        GeneratorInfo::new("mock", "mock-model-1")
    }
}
