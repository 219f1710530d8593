//! Mark aggregation and run-level statistics.

use serde::{Deserialize, Serialize};

use crate::model::{Answer, Question, Student};
use crate::report::StudentOutcome;

/// Sum a student's awarded marks.
///
/// Pure and order-independent. Totals are always recomputed from the full
/// answer set, never adjusted incrementally, so automated runs and manual
/// corrections can never drift apart.
pub fn total_marks(answers: &[Answer]) -> u32 {
    answers.iter().map(|a| a.student_marks).sum()
}

/// Apply a manual correction to one answer and recompute the total.
///
/// The review path shares the grading engine's aggregation: the corrected
/// award is clamped to the question's allocation and the student's total is
/// recomputed from every answer.
pub fn apply_manual_edit(
    student: &mut Student,
    question: &Question,
    marks: u32,
    feedback: Option<String>,
) -> anyhow::Result<u32> {
    let answer = student
        .answers
        .iter_mut()
        .find(|a| a.question_no == question.question_no)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "student {} has no answer for question {}",
                student.student_id,
                question.question_no
            )
        })?;

    let stored = marks.min(question.allocated_marks);
    answer.student_marks = stored;
    if let Some(feedback) = feedback {
        answer.feedback = feedback;
    }
    student.total_marks = total_marks(&student.answers);
    Ok(stored)
}

/// Aggregate statistics for one grading run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub students_graded: usize,
    pub students_persisted: usize,
    pub answers_scored: usize,
    pub shortcut_awards: usize,
    pub failed_answers: usize,
    pub skipped_answers: usize,
    pub clamped_awards: usize,
    pub persistence_failures: usize,
    pub mean_total_marks: f64,
    pub min_total_marks: u32,
    pub max_total_marks: u32,
}

/// Reduce per-student outcomes into run statistics.
pub fn compute_run_stats(outcomes: &[StudentOutcome]) -> RunStats {
    let mut stats = RunStats {
        students_graded: outcomes.len(),
        ..RunStats::default()
    };

    for outcome in outcomes {
        if outcome.persisted {
            stats.students_persisted += 1;
        }
        if outcome.persist_error.is_some() {
            stats.persistence_failures += 1;
        }
        stats.answers_scored += outcome.answers_scored;
        stats.shortcut_awards += outcome.shortcut_awards;
        stats.failed_answers += outcome.failed_answers;
        stats.skipped_answers += outcome.skipped_answers;
        stats.clamped_awards += outcome.clamped_awards;
    }

    if !outcomes.is_empty() {
        let totals: Vec<u32> = outcomes.iter().map(|o| o.total_marks).collect();
        stats.mean_total_marks =
            totals.iter().map(|&t| f64::from(t)).sum::<f64>() / totals.len() as f64;
        stats.min_total_marks = totals.iter().copied().min().unwrap_or(0);
        stats.max_total_marks = totals.iter().copied().max().unwrap_or(0);
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(question_no: u32, marks: u32) -> Answer {
        Answer {
            question_no,
            student_answer: String::new(),
            student_marks: marks,
            feedback: String::new(),
        }
    }

    fn outcome(student_id: &str, total: u32) -> StudentOutcome {
        StudentOutcome {
            student_id: student_id.into(),
            total_marks: total,
            answers_scored: 1,
            shortcut_awards: 0,
            failed_answers: 0,
            skipped_answers: 0,
            clamped_awards: 0,
            persisted: true,
            persist_error: None,
            cancelled: false,
        }
    }

    #[test]
    fn total_is_order_independent() {
        let mut answers = vec![answer(1, 3), answer(2, 7), answer(3, 5)];
        let forward = total_marks(&answers);
        answers.reverse();
        assert_eq!(forward, total_marks(&answers));
        assert_eq!(forward, 15);
    }

    #[test]
    fn empty_answer_set_totals_zero() {
        assert_eq!(total_marks(&[]), 0);
    }

    #[test]
    fn manual_edit_recomputes_total_from_full_set() {
        let question = Question {
            question_no: 2,
            question_text: "Q2".into(),
            expected_answer: String::new(),
            instruction: String::new(),
            allocated_marks: 10,
        };
        let mut student = Student {
            student_id: "IT2001".into(),
            module_id: "cs101".into(),
            answers: vec![answer(1, 4), answer(2, 2), answer(3, 6)],
            total_marks: 12,
        };

        let stored = apply_manual_edit(&mut student, &question, 9, Some("Regraded.".into())).unwrap();
        assert_eq!(stored, 9);
        assert_eq!(student.total_marks, 19);
        assert_eq!(student.answers[1].feedback, "Regraded.");
    }

    #[test]
    fn manual_edit_clamps_to_allocation() {
        let question = Question {
            question_no: 1,
            question_text: "Q1".into(),
            expected_answer: String::new(),
            instruction: String::new(),
            allocated_marks: 5,
        };
        let mut student = Student {
            student_id: "IT2002".into(),
            module_id: "cs101".into(),
            answers: vec![answer(1, 0)],
            total_marks: 0,
        };

        let stored = apply_manual_edit(&mut student, &question, 50, None).unwrap();
        assert_eq!(stored, 5);
        assert_eq!(student.total_marks, 5);
    }

    #[test]
    fn manual_edit_rejects_unanswered_question() {
        let question = Question {
            question_no: 9,
            question_text: "Q9".into(),
            expected_answer: String::new(),
            instruction: String::new(),
            allocated_marks: 5,
        };
        let mut student = Student {
            student_id: "IT2003".into(),
            module_id: "cs101".into(),
            answers: vec![answer(1, 2)],
            total_marks: 2,
        };
        assert!(apply_manual_edit(&mut student, &question, 3, None).is_err());
        assert_eq!(student.total_marks, 2);
    }

    #[test]
    fn run_stats_aggregate_counts_and_totals() {
        let mut second = outcome("IT2002", 30);
        second.persisted = false;
        second.persist_error = Some("disk full".into());
        second.failed_answers = 2;

        let outcomes = vec![outcome("IT2001", 10), second, outcome("IT2003", 20)];
        let stats = compute_run_stats(&outcomes);

        assert_eq!(stats.students_graded, 3);
        assert_eq!(stats.students_persisted, 2);
        assert_eq!(stats.persistence_failures, 1);
        assert_eq!(stats.failed_answers, 2);
        assert_eq!(stats.min_total_marks, 10);
        assert_eq!(stats.max_total_marks, 30);
        assert!((stats.mean_total_marks - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn run_stats_on_empty_run() {
        let stats = compute_run_stats(&[]);
        assert_eq!(stats.students_graded, 0);
        assert_eq!(stats.mean_total_marks, 0.0);
    }
}
