//! Scoring-response validation and parsing.
//!
//! The scoring service is asked for a small JSON payload carrying an awarded
//! mark and a feedback string. Nothing it returns is trusted: marks must be
//! numeric and in range, and any malformed response becomes a typed
//! [`ParseError`] instead of escaping into the pipeline.

use serde::Deserialize;
use thiserror::Error;

/// Feedback stored when the scoring service gives none, or scoring fails.
pub const NO_FEEDBACK: &str = "No feedback provided";

/// A validated (marks, feedback) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredMarks {
    pub marks: u32,
    pub feedback: String,
    /// True when the raw award fell outside `[0, allocated_marks]` and was
    /// clamped to the nearest bound.
    pub clamped: bool,
}

/// A scoring response that could not be validated.
///
/// Carries the original raw text for diagnostics; callers log it and fall
/// back to a zero award.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {source}")]
    InvalidJson {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response JSON has no numeric \"Marks Awarded\" field")]
    MissingMarks { raw: String },
}

impl ParseError {
    /// The raw scoring output that failed to validate.
    pub fn raw(&self) -> &str {
        match self {
            ParseError::InvalidJson { raw, .. } | ParseError::MissingMarks { raw } => raw,
        }
    }
}

/// Wire payload as produced by the scoring service.
///
/// Both documented key spellings are accepted.
#[derive(Deserialize)]
struct WirePayload {
    #[serde(default, alias = "Marks Awarded", alias = "marksAwarded")]
    marks_awarded: Option<serde_json::Number>,
    #[serde(default, alias = "Feedback")]
    feedback: Option<String>,
}

/// Parse raw scoring output into a validated award for a question worth
/// `allocated_marks`.
///
/// Tolerates a markdown code fence around the payload. Fractional awards
/// round half away from zero; awards outside `[0, allocated_marks]` clamp to
/// the nearest bound and the clamp is flagged. A missing or blank feedback
/// field becomes [`NO_FEEDBACK`].
pub fn parse_score_response(raw: &str, allocated_marks: u32) -> Result<ScoredMarks, ParseError> {
    let body = strip_code_fence(raw);

    let payload: WirePayload =
        serde_json::from_str(body).map_err(|source| ParseError::InvalidJson {
            raw: raw.to_string(),
            source,
        })?;

    let awarded = payload
        .marks_awarded
        .as_ref()
        .and_then(|n| n.as_f64())
        .ok_or_else(|| ParseError::MissingMarks {
            raw: raw.to_string(),
        })?;

    let rounded = awarded.round() as i64;
    let (marks, clamped) = if rounded < 0 {
        (0, true)
    } else if rounded as u64 > u64::from(allocated_marks) {
        (allocated_marks, true)
    } else {
        (rounded as u32, false)
    };

    let feedback = match payload.feedback {
        Some(f) if !f.trim().is_empty() => f,
        _ => NO_FEEDBACK.to_string(),
    };

    Ok(ScoredMarks {
        marks,
        feedback,
        clamped,
    })
}

/// Strip a surrounding markdown code fence, if any.
///
/// Scoring models wrap the payload in ```json fences often enough that
/// rejecting fenced output would turn good awards into zero defaults. Takes
/// the first fenced block (closed or not); without a fence, returns the
/// input trimmed.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after_ticks = &trimmed[start + 3..];
    let body = match after_ticks.find('\n') {
        Some(newline) => &after_ticks[newline + 1..],
        None => return trimmed,
    };
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_documented_payload() {
        let raw = r#"{"Marks Awarded": 7, "Feedback": "Good coverage of paging."}"#;
        let scored = parse_score_response(raw, 10).unwrap();
        assert_eq!(scored.marks, 7);
        assert_eq!(scored.feedback, "Good coverage of paging.");
        assert!(!scored.clamped);
    }

    #[test]
    fn parses_camel_case_keys() {
        let raw = r#"{"marksAwarded": 4, "feedback": "Partial."}"#;
        let scored = parse_score_response(raw, 5).unwrap();
        assert_eq!(scored.marks, 4);
        assert_eq!(scored.feedback, "Partial.");
    }

    #[test]
    fn strips_markdown_fence() {
        let raw = "```json\n{\"Marks Awarded\": 9, \"Feedback\": \"Nearly complete.\"}\n```";
        let scored = parse_score_response(raw, 10).unwrap();
        assert_eq!(scored.marks, 9);
    }

    #[test]
    fn strips_fence_with_surrounding_prose() {
        let raw = "Here is the grading result:\n```\n{\"Marks Awarded\": 3}\n```\nLet me know if you need anything else.";
        let scored = parse_score_response(raw, 10).unwrap();
        assert_eq!(scored.marks, 3);
        assert_eq!(scored.feedback, NO_FEEDBACK);
    }

    #[test]
    fn unclosed_fence_still_parses() {
        let raw = "```json\n{\"Marks Awarded\": 6, \"Feedback\": \"ok\"}";
        let scored = parse_score_response(raw, 10).unwrap();
        assert_eq!(scored.marks, 6);
    }

    #[test]
    fn clamps_over_allocation() {
        let raw = r#"{"Marks Awarded": 15, "Feedback": "Excellent."}"#;
        let scored = parse_score_response(raw, 10).unwrap();
        assert_eq!(scored.marks, 10);
        assert!(scored.clamped);
    }

    #[test]
    fn clamps_negative_award_to_zero() {
        let raw = r#"{"Marks Awarded": -3, "Feedback": "Off topic."}"#;
        let scored = parse_score_response(raw, 10).unwrap();
        assert_eq!(scored.marks, 0);
        assert!(scored.clamped);
    }

    #[test]
    fn rounds_fractional_awards() {
        let scored = parse_score_response(r#"{"Marks Awarded": 7.5}"#, 10).unwrap();
        assert_eq!(scored.marks, 8);
        let scored = parse_score_response(r#"{"Marks Awarded": 7.4}"#, 10).unwrap();
        assert_eq!(scored.marks, 7);
    }

    #[test]
    fn missing_feedback_gets_default() {
        let scored = parse_score_response(r#"{"Marks Awarded": 2, "Feedback": "  "}"#, 10).unwrap();
        assert_eq!(scored.feedback, NO_FEEDBACK);
    }

    #[test]
    fn non_json_is_a_parse_error_with_raw_preserved() {
        let raw = "The student clearly understood the material.";
        let err = parse_score_response(raw, 10).unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { .. }));
        assert_eq!(err.raw(), raw);
    }

    #[test]
    fn missing_marks_field_is_a_parse_error() {
        let err = parse_score_response(r#"{"Feedback": "nice"}"#, 10).unwrap_err();
        assert!(matches!(err, ParseError::MissingMarks { .. }));
    }

    #[test]
    fn string_marks_are_rejected() {
        assert!(parse_score_response(r#"{"Marks Awarded": "seven"}"#, 10).is_err());
    }
}
