//! The `markwise validate` command.

use std::path::PathBuf;

use anyhow::Result;

use markwise_store::ingest::{parse_marking_guide, validate_module, ModuleDetails};

pub fn execute(guide: PathBuf) -> Result<()> {
    let details = ModuleDetails {
        module_id: "(unsaved)".into(),
        ..ModuleDetails::default()
    };
    let module = parse_marking_guide(&guide, details)?;

    println!(
        "{}: {} questions, {} total marks",
        guide.display(),
        module.questions.len(),
        module
            .questions
            .iter()
            .map(|q| q.allocated_marks)
            .sum::<u32>()
    );

    let warnings = validate_module(&module);
    if warnings.is_empty() {
        println!("Marking guide is valid.");
    } else {
        for warning in &warnings {
            match warning.question_no {
                Some(no) => println!("  Warning (Q{no}): {}", warning.message),
                None => println!("  Warning: {}", warning.message),
            }
        }
        println!("{} warning(s).", warnings.len());
    }

    Ok(())
}
