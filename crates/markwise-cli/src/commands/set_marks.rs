//! The `markwise set-marks` command — the manual review path.

use std::path::PathBuf;

use anyhow::{Context, Result};

use markwise_core::aggregate::apply_manual_edit;
use markwise_core::traits::{ModuleStore, StudentStore};
use markwise_providers::load_config_from;
use markwise_store::JsonStore;

pub async fn execute(
    module_id: String,
    student_id: String,
    question_no: u32,
    marks: u32,
    feedback: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = JsonStore::new(&config.data_dir);

    let module = store
        .find_module(&module_id)
        .await?
        .with_context(|| format!("module not found: {module_id}"))?;
    let question = module
        .question(question_no)
        .with_context(|| format!("question {question_no} is not in the marking guide"))?;

    let mut student = store
        .find_student(&module_id, &student_id)
        .await?
        .with_context(|| format!("student not found: {student_id}"))?;

    let stored = apply_manual_edit(&mut student, question, marks, feedback)?;
    store.upsert_student(&student).await?;

    if stored < marks {
        println!(
            "Requested {marks} marks exceeds the allocation; stored {stored}/{} instead.",
            question.allocated_marks
        );
    }
    println!(
        "{}: Q{question_no} set to {stored}, new total {}",
        student.student_id, student.total_marks
    );

    Ok(())
}
