//! Mock scorer for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use markwise_core::error::ScoringError;
use markwise_core::traits::{ScoreRequest, ScoreResponse, ScoringProvider};

/// A mock scoring provider for exercising the grading engine without real
/// API calls.
///
/// Returns configurable raw payloads based on prompt content matching, and
/// can inject a failure for prompts containing a chosen substring.
pub struct MockScorer {
    /// Map of prompt substring → raw response payload.
    responses: HashMap<String, String>,
    /// Default payload if no prompt matches.
    default_response: String,
    /// Prompts containing this substring fail with a network error.
    fail_when: Option<String>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<ScoreRequest>>,
}

impl MockScorer {
    /// Create a mock with the given prompt-substring → payload mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses,
            default_response: r#"{"Marks Awarded": 0, "Feedback": "No feedback provided"}"#
                .to_string(),
            fail_when: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same payload.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            responses: HashMap::new(),
            default_response: response.to_string(),
            fail_when: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Fail any request whose prompt contains `needle`.
    pub fn failing_when(mut self, needle: &str) -> Self {
        self.fail_when = Some(needle.to_string());
        self
    }

    /// Get the number of calls made to this scorer.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this scorer.
    pub fn last_request(&self) -> Option<ScoreRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScoringProvider for MockScorer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn score(&self, request: &ScoreRequest) -> Result<ScoreResponse, ScoringError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Some(needle) = &self.fail_when {
            if request.prompt.contains(needle.as_str()) {
                return Err(ScoringError::Network("injected mock failure".into()));
            }
        }

        let content = self
            .responses
            .iter()
            .find(|(key, _)| request.prompt.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_response.clone());

        Ok(ScoreResponse {
            content,
            model: request.model.clone(),
            latency_ms: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_prompt(prompt: &str) -> ScoreRequest {
        ScoreRequest {
            model: "mock-model".into(),
            system_prompt: String::new(),
            prompt: prompt.into(),
            max_tokens: 500,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let scorer =
            MockScorer::with_fixed_response(r#"{"Marks Awarded": 5, "Feedback": "Fine."}"#);
        let response = scorer.score(&request_with_prompt("anything")).await.unwrap();
        assert!(response.content.contains("\"Marks Awarded\": 5"));
        assert_eq!(scorer.call_count(), 1);
        assert!(scorer.last_request().is_some());
    }

    #[tokio::test]
    async fn prompt_matching() {
        let mut responses = HashMap::new();
        responses.insert(
            "virtual memory".to_string(),
            r#"{"Marks Awarded": 8, "Feedback": "Covers paging."}"#.to_string(),
        );
        responses.insert(
            "deadlock".to_string(),
            r#"{"Marks Awarded": 2, "Feedback": "Missed two conditions."}"#.to_string(),
        );

        let scorer = MockScorer::new(responses);

        let resp = scorer
            .score(&request_with_prompt("Explain virtual memory"))
            .await
            .unwrap();
        assert!(resp.content.contains("paging"));

        let resp = scorer
            .score(&request_with_prompt("Define deadlock"))
            .await
            .unwrap();
        assert!(resp.content.contains("conditions"));
        assert_eq!(scorer.call_count(), 2);
    }

    #[tokio::test]
    async fn injected_failure() {
        let scorer = MockScorer::with_fixed_response("{}").failing_when("question 3");
        let err = scorer
            .score(&request_with_prompt("this is question 3"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::Network(_)));
        assert!(scorer
            .score(&request_with_prompt("this is question 4"))
            .await
            .is_ok());
    }
}
