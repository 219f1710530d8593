//! Results CSV export.
//!
//! Layout matches the marker-facing spreadsheet: module details up top, a
//! blank spacer row, then one row per student with per-question marks and
//! the total.

use std::path::Path;

use anyhow::{Context, Result};

use markwise_core::model::{Module, Student};

/// Render results as a CSV string.
pub fn results_csv_string(module: &Module, students: &[Student]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(["Module Name", module.module_name.as_str()])?;
    writer.write_record(["Module Code", module.module_code.as_str()])?;
    writer.write_record(["Academic Year", module.academic_year.as_str()])?;
    writer.write_record(["Semester", module.semester.as_str()])?;
    writer.write_record(["Batch", module.batch.as_str()])?;
    writer.write_record([""])?;

    let mut header = vec!["Student ID".to_string()];
    header.extend(
        module
            .questions
            .iter()
            .map(|q| format!("Q{} Marks", q.question_no)),
    );
    header.push("Total Marks".to_string());
    writer.write_record(&header)?;

    for student in students {
        let mut row = vec![student.student_id.clone()];
        for question in &module.questions {
            let marks = student
                .answers
                .iter()
                .find(|a| a.question_no == question.question_no)
                .map(|a| a.student_marks.to_string())
                .unwrap_or_default();
            row.push(marks);
        }
        row.push(student.total_marks.to_string());
        writer.write_record(&row)?;
    }

    let bytes = writer.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// Write results CSV to a file.
pub fn write_results_csv(module: &Module, students: &[Student], path: &Path) -> Result<()> {
    let csv = results_csv_string(module, students)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, csv)
        .with_context(|| format!("failed to write results CSV to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use markwise_core::model::{Answer, Question};

    fn module() -> Module {
        Module {
            module_id: "cs101".into(),
            module_name: "Operating Systems".into(),
            module_code: "CS101".into(),
            batch: "2026".into(),
            academic_year: "2025/2026".into(),
            semester: "1".into(),
            questions: vec![
                Question {
                    question_no: 1,
                    question_text: "Q1".into(),
                    expected_answer: String::new(),
                    instruction: String::new(),
                    allocated_marks: 10,
                },
                Question {
                    question_no: 2,
                    question_text: "Q2".into(),
                    expected_answer: String::new(),
                    instruction: String::new(),
                    allocated_marks: 5,
                },
            ],
        }
    }

    fn student(id: &str, marks: &[(u32, u32)]) -> Student {
        let answers: Vec<Answer> = marks
            .iter()
            .map(|&(question_no, student_marks)| Answer {
                question_no,
                student_answer: String::new(),
                student_marks,
                feedback: String::new(),
            })
            .collect();
        let total_marks = answers.iter().map(|a| a.student_marks).sum();
        Student {
            student_id: id.into(),
            module_id: "cs101".into(),
            answers,
            total_marks,
        }
    }

    #[test]
    fn csv_has_module_header_and_per_question_columns() {
        let csv = results_csv_string(
            &module(),
            &[student("IT2001", &[(1, 7), (2, 4)]), student("IT2002", &[(1, 10)])],
        )
        .unwrap();

        assert!(csv.contains("Module Name,Operating Systems"));
        assert!(csv.contains("Student ID,Q1 Marks,Q2 Marks,Total Marks"));
        assert!(csv.contains("IT2001,7,4,11"));
        // Missing answers render as empty cells, not zeros.
        assert!(csv.contains("IT2002,10,,10"));
    }

    #[test]
    fn writes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports").join("results.csv");
        write_results_csv(&module(), &[student("IT2001", &[(1, 3), (2, 2)])], &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("IT2001,3,2,5"));
    }
}
