//! CSV ingestion of marking guides and student answer sheets.
//!
//! Marking guide: `question_no,question,expected_answer,instruction,allocated_marks`,
//! one row per question. Answer sheet: a header row, then `student_id`
//! followed by one answer column per question; column order maps to question
//! numbers 1..n. Ingested answers start with zero marks and empty feedback.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use markwise_core::model::{Answer, Module, Question, Student};

/// Identification supplied alongside the marking guide.
#[derive(Debug, Clone, Default)]
pub struct ModuleDetails {
    pub module_id: String,
    pub module_name: String,
    pub module_code: String,
    pub batch: String,
    pub academic_year: String,
    pub semester: String,
}

#[derive(Debug, Deserialize)]
struct GuideRow {
    question_no: u32,
    question: String,
    expected_answer: String,
    #[serde(default)]
    instruction: String,
    allocated_marks: u32,
}

/// Parse a marking-guide CSV file into a module.
pub fn parse_marking_guide(path: &Path, details: ModuleDetails) -> Result<Module> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open marking guide: {}", path.display()))?;
    parse_marking_guide_reader(file, details)
        .with_context(|| format!("failed to parse marking guide: {}", path.display()))
}

/// Parse marking-guide CSV from any reader (useful for testing).
pub fn parse_marking_guide_reader<R: Read>(reader: R, details: ModuleDetails) -> Result<Module> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut questions = Vec::new();
    for (index, row) in csv_reader.deserialize::<GuideRow>().enumerate() {
        let row = row.with_context(|| format!("bad guide row {}", index + 2))?;
        questions.push(Question {
            question_no: row.question_no,
            question_text: row.question,
            expected_answer: row.expected_answer,
            instruction: row.instruction,
            allocated_marks: row.allocated_marks,
        });
    }

    Ok(Module {
        module_id: details.module_id,
        module_name: details.module_name,
        module_code: details.module_code,
        batch: details.batch,
        academic_year: details.academic_year,
        semester: details.semester,
        questions,
    })
}

/// Parse an answer-sheet CSV file into student records for `module`.
pub fn parse_answer_sheet(path: &Path, module: &Module) -> Result<Vec<Student>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open answer sheet: {}", path.display()))?;
    parse_answer_sheet_reader(file, module)
        .with_context(|| format!("failed to parse answer sheet: {}", path.display()))
}

/// Parse answer-sheet CSV from any reader (useful for testing).
pub fn parse_answer_sheet_reader<R: Read>(reader: R, module: &Module) -> Result<Vec<Student>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let mut students = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("bad answer row {}", index + 2))?;
        let Some(student_id) = record.get(0).map(str::trim).filter(|id| !id.is_empty()) else {
            continue;
        };

        let answers: Vec<Answer> = (1..record.len())
            .map(|column| Answer {
                question_no: column as u32,
                student_answer: record.get(column).unwrap_or_default().trim().to_string(),
                student_marks: 0,
                feedback: String::new(),
            })
            .collect();

        students.push(Student {
            student_id: student_id.to_string(),
            module_id: module.module_id.clone(),
            answers,
            total_marks: 0,
        });
    }

    Ok(students)
}

/// A warning from marking-guide validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question number (if applicable).
    pub question_no: Option<u32>,
    /// Warning message.
    pub message: String,
}

/// Validate a module's marking guide for common ingestion mistakes.
pub fn validate_module(module: &Module) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Check for duplicate question numbers
    let mut seen = std::collections::HashSet::new();
    for question in &module.questions {
        if !seen.insert(question.question_no) {
            warnings.push(ValidationWarning {
                question_no: Some(question.question_no),
                message: format!("duplicate question number: {}", question.question_no),
            });
        }
    }

    for question in &module.questions {
        if question.question_no == 0 {
            warnings.push(ValidationWarning {
                question_no: Some(0),
                message: "question numbers start at 1".into(),
            });
        }
        if question.question_text.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_no: Some(question.question_no),
                message: "question text is empty".into(),
            });
        }
        if question.allocated_marks == 0 {
            warnings.push(ValidationWarning {
                question_no: Some(question.question_no),
                message: "allocated marks is 0; every award will be 0".into(),
            });
        }
        if question.expected_answer.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_no: Some(question.question_no),
                message: "expected answer is empty; scoring will rely on the question text alone"
                    .into(),
            });
        }
    }

    if module.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_no: None,
            message: "marking guide has no questions".into(),
        });
    }

    warnings
}
