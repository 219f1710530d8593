//! The grading orchestrator.
//!
//! Drives the per-student, per-answer pipeline with bounded concurrency,
//! isolates scoring and parse failures to the answer they occurred on, and
//! aggregates and persists each student once all of its answers resolve.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::aggregate::{compute_run_stats, total_marks};
use crate::error::{GradingError, ScoringError};
use crate::model::{Answer, EvaluationOutcome, EvaluationResult, Module, Student};
use crate::prompt::{EvaluationRequest, SYSTEM_PROMPT};
use crate::report::{GradingReport, StudentOutcome};
use crate::response::{parse_score_response, NO_FEEDBACK};
use crate::shortcut::{ShortcutRule, FULL_MARKS_FEEDBACK};
use crate::traits::{ModuleStore, ScoreRequest, ScoreResponse, ScoringProvider, StudentStore};

/// Configuration for the grading engine.
#[derive(Debug, Clone)]
pub struct GradingEngineConfig {
    /// Maximum in-flight scoring requests across the whole run.
    pub parallelism: usize,
    /// Model identifier passed to the scoring provider.
    pub model: String,
    /// Sampling temperature. Keep at 0.0 for reproducible grading.
    pub temperature: f64,
    /// Response size bound per scoring call.
    pub max_tokens: u32,
    /// Retries on transient scoring errors.
    pub max_retries: u32,
    /// Base delay between retries.
    pub retry_delay: Duration,
    /// Deadline for a single scoring call.
    pub request_timeout: Duration,
}

impl Default for GradingEngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: 500,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Cooperative run-level cancellation.
///
/// Cancelling stops new scoring work from being dispatched; in-flight calls
/// drain, and students already persisted stay persisted. A cancelled run is a
/// valid partial-completion terminal state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_student_start(&self, student_id: &str, answer_count: usize);
    fn on_answer_resolved(&self, student_id: &str, result: &EvaluationResult);
    fn on_student_complete(&self, outcome: &StudentOutcome);
    fn on_run_complete(&self, outcomes: &[StudentOutcome], elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_student_start(&self, _: &str, _: usize) {}
    fn on_answer_resolved(&self, _: &str, _: &EvaluationResult) {}
    fn on_student_complete(&self, _: &StudentOutcome) {}
    fn on_run_complete(&self, _: &[StudentOutcome], _: Duration) {}
}

/// How one answer left the pipeline.
#[derive(Debug, Clone)]
enum AnswerResolution {
    Resolved(EvaluationResult),
    /// No matching question in the guide; excluded from scoring and the total.
    Skipped { question_no: u32 },
    /// Cancellation arrived before this answer was dispatched.
    Cancelled,
}

/// The grading engine.
pub struct GradingEngine {
    provider: Arc<dyn ScoringProvider>,
    modules: Arc<dyn ModuleStore>,
    students: Arc<dyn StudentStore>,
    shortcut: ShortcutRule,
    config: GradingEngineConfig,
}

impl GradingEngine {
    pub fn new(
        provider: Arc<dyn ScoringProvider>,
        modules: Arc<dyn ModuleStore>,
        students: Arc<dyn StudentStore>,
        config: GradingEngineConfig,
    ) -> Self {
        Self {
            provider,
            modules,
            students,
            shortcut: ShortcutRule::default(),
            config,
        }
    }

    /// Replace the default shortcut rule (e.g. with configured phrases).
    pub fn with_shortcut_rule(mut self, rule: ShortcutRule) -> Self {
        self.shortcut = rule;
        self
    }

    /// Grade every student of a module.
    ///
    /// The only fatal failure is a missing module. Scoring, parsing, and
    /// persistence failures are isolated to the answer or student they
    /// occurred on and recorded in the returned report.
    pub async fn run(
        &self,
        module_id: &str,
        cancel: &CancelToken,
        progress: &dyn ProgressReporter,
    ) -> Result<GradingReport, GradingError> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();

        let module = self
            .modules
            .find_module(module_id)
            .await
            .map_err(GradingError::Store)?
            .ok_or_else(|| GradingError::ModuleNotFound(module_id.to_string()))?;
        let module = Arc::new(module);

        let students = self
            .students
            .list_students(module_id)
            .await
            .map_err(GradingError::Store)?;

        tracing::info!(
            module_id,
            students = students.len(),
            questions = module.questions.len(),
            parallelism = self.config.parallelism,
            "starting grading run"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.parallelism));

        let mut futures = FuturesUnordered::new();
        for student in students {
            futures.push(self.grade_student(
                student,
                Arc::clone(&module),
                Arc::clone(&semaphore),
                cancel.clone(),
                progress,
            ));
        }

        let mut outcomes = Vec::new();
        while let Some(outcome) = futures.next().await {
            progress.on_student_complete(&outcome);
            outcomes.push(outcome);
        }

        let elapsed = start.elapsed();
        progress.on_run_complete(&outcomes, elapsed);

        let stats = compute_run_stats(&outcomes);
        Ok(GradingReport {
            id: run_id,
            created_at: chrono::Utc::now(),
            module_id: module.module_id.clone(),
            module_name: module.module_name.clone(),
            students: outcomes,
            stats,
            cancelled: cancel.is_cancelled(),
            duration_ms: elapsed.as_millis() as u64,
        })
    }

    /// Resolve every answer of one student, then aggregate and persist.
    async fn grade_student(
        &self,
        mut student: Student,
        module: Arc<Module>,
        semaphore: Arc<Semaphore>,
        cancel: CancelToken,
        progress: &dyn ProgressReporter,
    ) -> StudentOutcome {
        progress.on_student_start(&student.student_id, student.answers.len());

        let mut outcome = StudentOutcome {
            student_id: student.student_id.clone(),
            total_marks: student.total_marks,
            answers_scored: 0,
            shortcut_awards: 0,
            failed_answers: 0,
            skipped_answers: 0,
            clamped_awards: 0,
            persisted: false,
            persist_error: None,
            cancelled: false,
        };

        if cancel.is_cancelled() {
            outcome.cancelled = true;
            return outcome;
        }

        let mut answer_futures = FuturesUnordered::new();
        for (index, answer) in student.answers.iter().enumerate() {
            let module = Arc::clone(&module);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let answer = answer.clone();
            let student_id = student.student_id.clone();
            answer_futures.push(async move {
                let resolution = self
                    .resolve_answer(&student_id, answer, &module, semaphore, cancel)
                    .await;
                (index, resolution)
            });
        }

        let mut resolutions = Vec::with_capacity(student.answers.len());
        while let Some((index, resolution)) = answer_futures.next().await {
            if let AnswerResolution::Resolved(result) = &resolution {
                progress.on_answer_resolved(&student.student_id, result);
            }
            resolutions.push((index, resolution));
        }
        drop(answer_futures);
        resolutions.sort_by_key(|(index, _)| *index);

        for ((_, resolution), answer) in resolutions.into_iter().zip(student.answers.iter_mut()) {
            match resolution {
                AnswerResolution::Resolved(result) => {
                    answer.student_marks = result.student_marks;
                    answer.feedback = result.feedback;
                    match result.outcome {
                        EvaluationOutcome::Shortcut => outcome.shortcut_awards += 1,
                        EvaluationOutcome::Scored { clamped } => {
                            outcome.answers_scored += 1;
                            if clamped {
                                outcome.clamped_awards += 1;
                            }
                        }
                        EvaluationOutcome::Failed { .. } => outcome.failed_answers += 1,
                    }
                }
                AnswerResolution::Skipped { question_no } => {
                    tracing::warn!(
                        student_id = %student.student_id,
                        question_no,
                        "answer has no matching question in the guide; excluded from scoring"
                    );
                    outcome.skipped_answers += 1;
                }
                AnswerResolution::Cancelled => outcome.cancelled = true,
            }
        }

        student.total_marks = total_marks(&student.answers);
        outcome.total_marks = student.total_marks;

        if outcome.cancelled {
            tracing::warn!(
                student_id = %student.student_id,
                "run cancelled before this student fully resolved; not persisting"
            );
            return outcome;
        }

        match self.persist_student(&student).await {
            Ok(()) => outcome.persisted = true,
            Err(e) => {
                tracing::error!(
                    student_id = %student.student_id,
                    "failed to persist student after retry: {e:#}"
                );
                outcome.persist_error = Some(format!("{e:#}"));
            }
        }

        outcome
    }

    /// Resolve one answer: question lookup, shortcut, or score + validate.
    async fn resolve_answer(
        &self,
        student_id: &str,
        answer: Answer,
        module: &Module,
        semaphore: Arc<Semaphore>,
        cancel: CancelToken,
    ) -> AnswerResolution {
        let Some(question) = module.question(answer.question_no) else {
            return AnswerResolution::Skipped {
                question_no: answer.question_no,
            };
        };

        // Shortcut awards never consult the answer text or the scoring
        // service, and take no permit.
        if self.shortcut.triggers(question) {
            return AnswerResolution::Resolved(EvaluationResult {
                question_no: question.question_no,
                student_marks: question.allocated_marks,
                feedback: FULL_MARKS_FEEDBACK.to_string(),
                outcome: EvaluationOutcome::Shortcut,
            });
        }

        let Ok(_permit) = semaphore.acquire_owned().await else {
            return AnswerResolution::Cancelled;
        };
        if cancel.is_cancelled() {
            return AnswerResolution::Cancelled;
        }

        let request = EvaluationRequest::new(question, &answer);
        let score_request = ScoreRequest {
            model: self.config.model.clone(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            prompt: request.render(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let resolved = match self.score_with_retries(&score_request).await {
            Ok(response) => match parse_score_response(&response.content, question.allocated_marks)
            {
                Ok(scored) => EvaluationResult {
                    question_no: question.question_no,
                    student_marks: scored.marks,
                    feedback: scored.feedback,
                    outcome: EvaluationOutcome::Scored {
                        clamped: scored.clamped,
                    },
                },
                Err(e) => {
                    tracing::warn!(
                        student_id,
                        question_no = question.question_no,
                        raw = e.raw(),
                        "unparseable scoring response: {e}"
                    );
                    failed_result(question.question_no, e.to_string())
                }
            },
            Err(e) => {
                tracing::warn!(
                    student_id,
                    question_no = question.question_no,
                    "scoring unavailable: {e}"
                );
                failed_result(question.question_no, e.to_string())
            }
        };

        AnswerResolution::Resolved(resolved)
    }

    /// Call the scoring provider with a per-call deadline and bounded retries.
    ///
    /// Rate-limit hints override the backoff delay; permanent errors
    /// (authentication, unknown model) are never retried.
    async fn score_with_retries(
        &self,
        request: &ScoreRequest,
    ) -> Result<ScoreResponse, ScoringError> {
        let mut retry_delay = self.config.retry_delay;
        let mut last_error = None;

        for retry in 0..=self.config.max_retries {
            if retry > 0 {
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(Duration::from_secs(60));
            }

            match tokio::time::timeout(self.config.request_timeout, self.provider.score(request))
                .await
            {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(e)) => {
                    if e.is_permanent() {
                        return Err(e);
                    }
                    if let Some(ms) = e.retry_after_ms() {
                        retry_delay = Duration::from_millis(ms);
                    }
                    last_error = Some(e);
                }
                Err(_) => {
                    last_error =
                        Some(ScoringError::Timeout(self.config.request_timeout.as_secs()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ScoringError::Network("no attempts made".into())))
    }

    /// Upsert with a single retry; other students are unaffected either way.
    async fn persist_student(&self, student: &Student) -> anyhow::Result<()> {
        if let Err(first) = self.students.upsert_student(student).await {
            tracing::warn!(
                student_id = %student.student_id,
                "persist failed, retrying once: {first:#}"
            );
            self.students.upsert_student(student).await?;
        }
        Ok(())
    }
}

fn failed_result(question_no: u32, reason: String) -> EvaluationResult {
    EvaluationResult {
        question_no,
        student_marks: 0,
        feedback: NO_FEEDBACK.to_string(),
        outcome: EvaluationOutcome::Failed { reason },
    }
}
