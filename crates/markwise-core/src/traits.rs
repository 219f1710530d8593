//! Seam traits: the scoring service and the persistence layer.
//!
//! These async traits are implemented by the `markwise-providers` and
//! `markwise-store` crates respectively.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::model::{Module, Student};

// ---------------------------------------------------------------------------
// Scoring provider trait
// ---------------------------------------------------------------------------

/// A scoring capability that judges one student answer against its question.
#[async_trait]
pub trait ScoringProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Send one scoring request and return the raw model output.
    async fn score(&self, request: &ScoreRequest) -> Result<ScoreResponse, ScoringError>;
}

/// One request to the scoring service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    /// Model identifier (e.g. "gpt-4o-mini").
    pub model: String,
    /// System prompt framing the grading task.
    pub system_prompt: String,
    /// The rendered evaluation prompt.
    pub prompt: String,
    /// Response size bound.
    pub max_tokens: u32,
    /// Sampling temperature. 0.0 keeps repeated runs reproducible modulo
    /// service nondeterminism.
    pub temperature: f64,
}

/// Raw output from the scoring service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    /// Raw response text, expected to parse as the marks/feedback payload.
    pub content: String,
    /// Model that actually produced the response.
    pub model: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

// ---------------------------------------------------------------------------
// Store traits
// ---------------------------------------------------------------------------

/// Read access to module records.
#[async_trait]
pub trait ModuleStore: Send + Sync {
    /// Fetch a module by id. `Ok(None)` when no such module exists.
    async fn find_module(&self, module_id: &str) -> anyhow::Result<Option<Module>>;
}

/// Read/write access to student records.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// List all students registered for a module.
    async fn list_students(&self, module_id: &str) -> anyhow::Result<Vec<Student>>;

    /// Fetch one student. `Ok(None)` when absent.
    async fn find_student(
        &self,
        module_id: &str,
        student_id: &str,
    ) -> anyhow::Result<Option<Student>>;

    /// Insert or replace a student record (answers and total).
    async fn upsert_student(&self, student: &Student) -> anyhow::Result<()>;
}
