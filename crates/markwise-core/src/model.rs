//! Core data model types for markwise.
//!
//! These are the shapes produced by ingestion, mutated by a grading run, and
//! read back by review and export.

use serde::{Deserialize, Serialize};

/// A single marking-guide entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Question number, unique within a module, starting at 1.
    pub question_no: u32,
    /// The question as shown to students.
    pub question_text: String,
    /// Model answer from the marking guide.
    pub expected_answer: String,
    /// Marker's instruction for this question. Outranks the rubric when grading.
    #[serde(default)]
    pub instruction: String,
    /// Maximum marks awardable for this question.
    pub allocated_marks: u32,
}

/// One student's answer to one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_no: u32,
    #[serde(default)]
    pub student_answer: String,
    /// Awarded marks. Stays within `[0, allocated_marks]` of the matched question.
    #[serde(default)]
    pub student_marks: u32,
    #[serde(default)]
    pub feedback: String,
}

/// A student's answer sheet for one module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub student_id: String,
    pub module_id: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
    /// Invariant: equals the sum of `answers[].student_marks` after any write.
    #[serde(default)]
    pub total_marks: u32,
}

/// A module: identification plus its marking guide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub module_id: String,
    pub module_name: String,
    #[serde(default)]
    pub module_code: String,
    #[serde(default)]
    pub batch: String,
    #[serde(default)]
    pub academic_year: String,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Module {
    /// Look up a question by number.
    pub fn question(&self, question_no: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.question_no == question_no)
    }
}

/// How a single answer was resolved during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluationOutcome {
    /// The marking guide forced full marks; the scoring service was not consulted.
    Shortcut,
    /// The scoring service returned a usable award.
    Scored {
        /// True when the raw award fell outside the allocation and was clamped.
        clamped: bool,
    },
    /// Scoring or parsing failed; the answer defaulted to zero marks.
    Failed { reason: String },
}

/// The transient result of evaluating one answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub question_no: u32,
    pub student_marks: u32,
    pub feedback: String,
    pub outcome: EvaluationOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(no: u32) -> Question {
        Question {
            question_no: no,
            question_text: format!("Question {no}"),
            expected_answer: "Expected".into(),
            instruction: String::new(),
            allocated_marks: 10,
        }
    }

    #[test]
    fn question_lookup_by_number() {
        let module = Module {
            module_id: "cs101".into(),
            module_name: "Intro".into(),
            module_code: "CS101".into(),
            batch: String::new(),
            academic_year: String::new(),
            semester: String::new(),
            questions: vec![question(1), question(3)],
        };
        assert_eq!(module.question(3).map(|q| q.question_no), Some(3));
        assert!(module.question(2).is_none());
    }

    #[test]
    fn student_serde_roundtrip() {
        let student = Student {
            student_id: "IT2001".into(),
            module_id: "cs101".into(),
            answers: vec![Answer {
                question_no: 1,
                student_answer: "An operating system manages hardware.".into(),
                student_marks: 7,
                feedback: "Mostly correct".into(),
            }],
            total_marks: 7,
        };
        let json = serde_json::to_string(&student).unwrap();
        let back: Student = serde_json::from_str(&json).unwrap();
        assert_eq!(back.student_id, "IT2001");
        assert_eq!(back.answers.len(), 1);
        assert_eq!(back.total_marks, 7);
    }

    #[test]
    fn answer_defaults_on_deserialize() {
        let answer: Answer = serde_json::from_str(r#"{"question_no": 2}"#).unwrap();
        assert_eq!(answer.student_marks, 0);
        assert!(answer.student_answer.is_empty());
        assert!(answer.feedback.is_empty());
    }
}
