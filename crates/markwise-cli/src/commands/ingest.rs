//! The `markwise ingest` command.

use std::path::PathBuf;

use anyhow::Result;

use markwise_core::traits::StudentStore;
use markwise_providers::load_config_from;
use markwise_store::ingest::{
    parse_answer_sheet, parse_marking_guide, validate_module, ModuleDetails,
};
use markwise_store::JsonStore;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    module_id: String,
    name: String,
    code: String,
    batch: String,
    academic_year: String,
    semester: String,
    guide: PathBuf,
    answers: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let details = ModuleDetails {
        module_id,
        module_name: name,
        module_code: code,
        batch,
        academic_year,
        semester,
    };

    let module = parse_marking_guide(&guide, details)?;

    let warnings = validate_module(&module);
    for warning in &warnings {
        match warning.question_no {
            Some(no) => eprintln!("Warning (Q{no}): {}", warning.message),
            None => eprintln!("Warning: {}", warning.message),
        }
    }

    let students = parse_answer_sheet(&answers, &module)?;

    let store = JsonStore::new(&config.data_dir);
    store.upsert_module(&module).await?;
    for student in &students {
        store.upsert_student(student).await?;
    }

    println!(
        "Ingested module '{}' with {} questions and {} students into {}",
        module.module_id,
        module.questions.len(),
        students.len(),
        config.data_dir.display()
    );
    if !warnings.is_empty() {
        println!("{} validation warning(s) above.", warnings.len());
    }

    Ok(())
}
