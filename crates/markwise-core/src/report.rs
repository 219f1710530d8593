//! Grading-run report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::RunStats;

/// A complete record of one grading run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingReport {
    /// Unique run identifier.
    pub id: Uuid,
    /// When the run finished.
    pub created_at: DateTime<Utc>,
    pub module_id: String,
    pub module_name: String,
    /// Per-student outcomes, in completion order.
    pub students: Vec<StudentOutcome>,
    /// Aggregate statistics over all students.
    pub stats: RunStats,
    /// True when the run was cancelled before every student resolved.
    #[serde(default)]
    pub cancelled: bool,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// What happened to one student during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentOutcome {
    pub student_id: String,
    pub total_marks: u32,
    /// Answers awarded by the scoring service.
    pub answers_scored: usize,
    /// Answers awarded by the shortcut rule.
    pub shortcut_awards: usize,
    /// Answers that defaulted to zero after a scoring or parse failure.
    pub failed_answers: usize,
    /// Answers with no matching question in the guide, excluded from scoring.
    pub skipped_answers: usize,
    /// Awards that fell outside the allocation and were clamped.
    pub clamped_awards: usize,
    /// Whether the student record was saved.
    pub persisted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persist_error: Option<String>,
    /// True when cancellation interrupted this student's batch.
    #[serde(default)]
    pub cancelled: bool,
}

impl GradingReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradingReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
