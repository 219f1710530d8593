//! Evaluation request construction and prompt rendering.

use serde::{Deserialize, Serialize};

use crate::model::{Answer, Question};

/// System prompt shared by the scoring-service adapters.
pub const SYSTEM_PROMPT: &str = "You are an educational assistant that evaluates student responses for conceptual correctness and completeness, providing a score and feedback. Respond ONLY with the requested JSON object, with no surrounding commentary.";

/// An immutable scoring request for one matched (question, answer) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub question_text: String,
    pub expected_answer: String,
    /// The marker's instruction. Flagged to the scoring service as outranking
    /// its own rubric judgment.
    pub instruction: String,
    /// Defines the valid output range `[0, allocated_marks]`.
    pub allocated_marks: u32,
    pub student_answer: String,
}

impl EvaluationRequest {
    /// Build a request from a matched pair.
    pub fn new(question: &Question, answer: &Answer) -> Self {
        debug_assert_eq!(question.question_no, answer.question_no);
        Self {
            question_text: question.question_text.clone(),
            expected_answer: question.expected_answer.clone(),
            instruction: question.instruction.clone(),
            allocated_marks: question.allocated_marks,
            student_answer: answer.student_answer.clone(),
        }
    }

    /// Render the user prompt sent to the scoring service.
    ///
    /// Deterministic: the same request always renders the same text.
    pub fn render(&self) -> String {
        format!(
            "Grade the student answer below against the marking guide.\n\
             \n\
             When grading:\n\
             \n\
             - The Instruction from the marking guide takes priority over everything else.\n\
             - Ignore spelling and grammar mistakes.\n\
             - If the answer satisfactorily addresses the question and meets the instruction, award full marks.\n\
             - If the answer is irrelevant to the question, or admits to not knowing, award 0 marks.\n\
             \n\
             **Question**: {question}\n\
             **Expected Answer**: {expected}\n\
             **Instruction**: {instruction}\n\
             **Allocated Marks**: {allocated}\n\
             \n\
             **Student Answer**: {answer}\n\
             \n\
             Respond with a single JSON object:\n\
             \n\
             {{\n\
             \x20\x20\"Marks Awarded\": <number between 0 and {allocated}>,\n\
             \x20\x20\"Feedback\": \"<brief feedback explaining the reason for the assigned score>\"\n\
             }}\n",
            question = self.question_text,
            expected = self.expected_answer,
            instruction = self.instruction,
            allocated = self.allocated_marks,
            answer = self.student_answer,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> EvaluationRequest {
        let question = Question {
            question_no: 1,
            question_text: "What is virtual memory?".into(),
            expected_answer: "An abstraction of physical memory using paging.".into(),
            instruction: "Accept any mention of paging or swapping.".into(),
            allocated_marks: 8,
        };
        let answer = Answer {
            question_no: 1,
            student_answer: "Memory that the OS fakes with disk.".into(),
            student_marks: 0,
            feedback: String::new(),
        };
        EvaluationRequest::new(&question, &answer)
    }

    #[test]
    fn rendering_is_deterministic() {
        let request = sample_request();
        assert_eq!(request.render(), request.render());
    }

    #[test]
    fn prompt_carries_every_field() {
        let rendered = sample_request().render();
        assert!(rendered.contains("What is virtual memory?"));
        assert!(rendered.contains("An abstraction of physical memory using paging."));
        assert!(rendered.contains("Accept any mention of paging or swapping."));
        assert!(rendered.contains("Memory that the OS fakes with disk."));
        assert!(rendered.contains("between 0 and 8"));
    }

    #[test]
    fn prompt_states_the_grading_rules() {
        let rendered = sample_request().render();
        assert!(rendered.contains("takes priority"));
        assert!(rendered.contains("Ignore spelling and grammar"));
        assert!(rendered.contains("award 0 marks"));
    }

    #[test]
    fn building_does_not_mutate_inputs() {
        let question = Question {
            question_no: 2,
            question_text: "Q".into(),
            expected_answer: "E".into(),
            instruction: "I".into(),
            allocated_marks: 5,
        };
        let answer = Answer {
            question_no: 2,
            student_answer: "A".into(),
            student_marks: 3,
            feedback: "old".into(),
        };
        let _ = EvaluationRequest::new(&question, &answer);
        assert_eq!(answer.student_marks, 3);
        assert_eq!(answer.feedback, "old");
    }
}
