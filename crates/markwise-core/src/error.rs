//! Error taxonomy for scoring calls and grading runs.
//!
//! `ScoringError` is defined here rather than in the provider crate so the
//! engine can classify failures for retry decisions without string matching.

use thiserror::Error;

/// Errors surfaced by a scoring-service adapter.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),
}

impl ScoringError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ScoringError::AuthenticationFailed(_) | ScoringError::ModelNotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ScoringError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Fatal errors for a whole grading run.
///
/// Everything else (scoring failures, parse failures, persistence failures)
/// is isolated to the answer or student it occurred on and recorded in the
/// run report.
#[derive(Debug, Error)]
pub enum GradingError {
    /// The module to grade has no record; there is nothing to score against.
    #[error("module not found: {0}")]
    ModuleNotFound(String),

    /// The store failed while loading the module or its students.
    #[error("store error: {0:#}")]
    Store(anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_errors_are_not_retryable() {
        assert!(ScoringError::AuthenticationFailed("bad key".into()).is_permanent());
        assert!(ScoringError::ModelNotFound("gpt-nope".into()).is_permanent());
        assert!(!ScoringError::Network("reset".into()).is_permanent());
        assert!(!ScoringError::Timeout(60).is_permanent());
    }

    #[test]
    fn rate_limit_carries_retry_hint() {
        let err = ScoringError::RateLimited {
            retry_after_ms: 5000,
        };
        assert_eq!(err.retry_after_ms(), Some(5000));
        assert_eq!(ScoringError::Timeout(30).retry_after_ms(), None);
    }
}
