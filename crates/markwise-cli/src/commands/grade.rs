//! The `markwise grade` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use markwise_core::engine::{CancelToken, GradingEngine, ProgressReporter};
use markwise_core::model::{EvaluationOutcome, EvaluationResult};
use markwise_core::report::{GradingReport, StudentOutcome};
use markwise_core::traits::{ModuleStore, ScoringProvider, StudentStore};
use markwise_providers::{create_provider, load_config_from};
use markwise_store::JsonStore;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_student_start(&self, student_id: &str, answer_count: usize) {
        eprintln!("  Grading: {student_id} ({answer_count} answers)");
    }

    fn on_answer_resolved(&self, student_id: &str, result: &EvaluationResult) {
        let how = match &result.outcome {
            EvaluationOutcome::Shortcut => "shortcut",
            EvaluationOutcome::Scored { clamped: true } => "scored (clamped)",
            EvaluationOutcome::Scored { clamped: false } => "scored",
            EvaluationOutcome::Failed { .. } => "FAILED",
        };
        eprintln!(
            "    {student_id} Q{}: {} marks [{how}]",
            result.question_no, result.student_marks
        );
    }

    fn on_student_complete(&self, outcome: &StudentOutcome) {
        let persisted = if outcome.persisted {
            "saved"
        } else if outcome.cancelled {
            "cancelled"
        } else {
            "NOT SAVED"
        };
        eprintln!(
            "  Done: {} total {} ({persisted})",
            outcome.student_id, outcome.total_marks
        );
    }

    fn on_run_complete(&self, outcomes: &[StudentOutcome], elapsed: Duration) {
        let persisted = outcomes.iter().filter(|o| o.persisted).count();
        eprintln!(
            "\nComplete: {persisted}/{} students saved ({:.1}s)",
            outcomes.len(),
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    module_id: String,
    model_spec: Option<String>,
    parallelism: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    if let Some(parallelism) = parallelism {
        anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");
    }

    // Resolve "provider/model", bare model id, or config defaults.
    let (provider_name, model) = match &model_spec {
        Some(spec) => match spec.split_once('/') {
            Some((provider, model)) => (provider.to_string(), Some(model.to_string())),
            None => (config.default_provider.clone(), Some(spec.clone())),
        },
        None => (config.default_provider.clone(), None),
    };

    let Some(provider_config) = config.providers.get(&provider_name) else {
        anyhow::bail!(
            "provider '{}' not found in config. Available: {:?}",
            provider_name,
            config.providers.keys().collect::<Vec<_>>()
        );
    };
    let provider: Arc<dyn ScoringProvider> = Arc::from(create_provider(provider_config)?);

    let mut engine_config = config.engine_config(model);
    if let Some(parallelism) = parallelism {
        engine_config.parallelism = parallelism;
    }

    eprintln!(
        "markwise v{} — grading module '{}' via {}/{}",
        env!("CARGO_PKG_VERSION"),
        module_id,
        provider_name,
        engine_config.model
    );
    eprintln!();

    let store = Arc::new(JsonStore::new(&config.data_dir));
    let engine = GradingEngine::new(
        provider,
        Arc::clone(&store) as Arc<dyn ModuleStore>,
        store as Arc<dyn StudentStore>,
        engine_config,
    )
    .with_shortcut_rule(config.shortcut_rule());

    // Ctrl-C stops dispatching new scoring work; in-flight calls drain and
    // fully-graded students keep their saved marks.
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nCancellation requested; letting in-flight scoring calls drain...");
                cancel.cancel();
            }
        });
    }

    let report = engine.run(&module_id, &cancel, &ConsoleReporter).await?;

    print_summary(&report);

    std::fs::create_dir_all(&config.report_dir)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    let report_path = config.report_dir.join(format!("report-{timestamp}.json"));
    report.save_json(&report_path)?;
    eprintln!("Run report saved to: {}", report_path.display());

    Ok(())
}

fn print_summary(report: &GradingReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Student",
        "Total",
        "Scored",
        "Shortcut",
        "Failed",
        "Skipped",
        "Saved",
    ]);

    for outcome in &report.students {
        let saved = if outcome.persisted {
            "yes".to_string()
        } else if let Some(err) = &outcome.persist_error {
            format!("no: {err}")
        } else {
            "no".to_string()
        };
        table.add_row(vec![
            Cell::new(&outcome.student_id),
            Cell::new(outcome.total_marks),
            Cell::new(outcome.answers_scored),
            Cell::new(outcome.shortcut_awards),
            Cell::new(outcome.failed_answers),
            Cell::new(outcome.skipped_answers),
            Cell::new(saved),
        ]);
    }

    eprintln!("\n{table}");

    let stats = &report.stats;
    eprintln!(
        "Mean total: {:.1} (min {}, max {}) | failed answers: {} | skipped: {} | clamped: {}{}",
        stats.mean_total_marks,
        stats.min_total_marks,
        stats.max_total_marks,
        stats.failed_answers,
        stats.skipped_answers,
        stats.clamped_awards,
        if report.cancelled { " | RUN CANCELLED" } else { "" },
    );
}
