//! Instruction-driven full-marks override.
//!
//! Markers can force full credit for a question regardless of what the
//! scoring service would say, by putting a trigger phrase in the question's
//! instruction.

use crate::model::Question;

/// Feedback attached when the shortcut rule awards full marks.
pub const FULL_MARKS_FEEDBACK: &str = "As per the marking guide, full marks are awarded.";

/// Instruction phrases that force full marks by default.
pub const DEFAULT_TRIGGER_PHRASES: &[&str] = &["give full marks", "award full marks"];

/// Decides whether a question's instruction mandates an automatic full award.
///
/// Matching is a case-insensitive substring check against the configured
/// phrase set. When the rule triggers, the pipeline awards `allocated_marks`
/// exactly and never consults the student's answer or the scoring service.
#[derive(Debug, Clone)]
pub struct ShortcutRule {
    phrases: Vec<String>,
}

impl Default for ShortcutRule {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_PHRASES.iter().map(|p| p.to_string()))
    }
}

impl ShortcutRule {
    pub fn new(phrases: impl IntoIterator<Item = String>) -> Self {
        Self {
            phrases: phrases.into_iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// True when the question's instruction contains any trigger phrase.
    pub fn triggers(&self, question: &Question) -> bool {
        let instruction = question.instruction.to_lowercase();
        self.phrases.iter().any(|p| instruction.contains(p))
    }
}
