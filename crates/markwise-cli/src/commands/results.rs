//! The `markwise results` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use markwise_core::model::{Module, Student};
use markwise_core::traits::{ModuleStore, StudentStore};
use markwise_providers::load_config_from;
use markwise_store::JsonStore;

pub async fn execute(
    module_id: String,
    student_id: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = JsonStore::new(&config.data_dir);

    let module = store
        .find_module(&module_id)
        .await?
        .with_context(|| format!("module not found: {module_id}"))?;

    match student_id {
        Some(student_id) => {
            let student = store
                .find_student(&module_id, &student_id)
                .await?
                .with_context(|| format!("student not found: {student_id}"))?;
            print_student_detail(&module, &student);
        }
        None => {
            let students = store.list_students(&module_id).await?;
            print_module_table(&module, &students);
        }
    }

    Ok(())
}

fn print_module_table(module: &Module, students: &[Student]) {
    use comfy_table::{Cell, Table};

    println!(
        "{} ({}) — {} students",
        module.module_name,
        module.module_code,
        students.len()
    );

    let mut table = Table::new();
    let mut header = vec!["Student ID".to_string()];
    header.extend(
        module
            .questions
            .iter()
            .map(|q| format!("Q{} ({})", q.question_no, q.allocated_marks)),
    );
    header.push("Total".to_string());
    table.set_header(header);

    for student in students {
        let mut row = vec![Cell::new(&student.student_id)];
        for question in &module.questions {
            let marks = student
                .answers
                .iter()
                .find(|a| a.question_no == question.question_no)
                .map(|a| a.student_marks.to_string())
                .unwrap_or_else(|| "-".to_string());
            row.push(Cell::new(marks));
        }
        row.push(Cell::new(student.total_marks));
        table.add_row(row);
    }

    println!("{table}");
}

fn print_student_detail(module: &Module, student: &Student) {
    println!(
        "{} — {} (total {} marks)",
        student.student_id, module.module_name, student.total_marks
    );
    println!();

    for answer in &student.answers {
        match module.question(answer.question_no) {
            Some(question) => {
                println!(
                    "Q{} ({}/{}): {}",
                    answer.question_no,
                    answer.student_marks,
                    question.allocated_marks,
                    question.question_text
                );
            }
            None => {
                println!(
                    "Q{} (not in guide, excluded from scoring)",
                    answer.question_no
                );
            }
        }
        if !answer.student_answer.is_empty() {
            println!("  Answer: {}", answer.student_answer);
        }
        if !answer.feedback.is_empty() {
            println!("  Feedback: {}", answer.feedback);
        }
        println!();
    }
}
