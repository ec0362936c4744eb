use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One question-answer event. Append-only; never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Identifier of the plant the player was asked to name.
    pub subject_id: String,
    pub selected: String,
    pub expected: String,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
    /// Seconds between the question being shown and the answer landing.
    pub time_to_answer: f64,
}

impl AnswerRecord {
    /// Grade a submission against the expected answer. Comparison trims
    /// surrounding whitespace; everything else is exact.
    pub fn graded(
        subject_id: &str,
        selected: &str,
        expected: &str,
        answered_at: DateTime<Utc>,
        time_to_answer: f64,
    ) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            selected: selected.to_string(),
            expected: expected.to_string(),
            is_correct: selected.trim() == expected.trim(),
            answered_at,
            time_to_answer: time_to_answer.max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grading_trims_whitespace() {
        let record = AnswerRecord::graded("ficus-lyrata", "  Fiddle-leaf fig ", "Fiddle-leaf fig", Utc::now(), 1.2);
        assert!(record.is_correct);
    }

    #[test]
    fn grading_is_case_sensitive() {
        let record = AnswerRecord::graded("ficus-lyrata", "fiddle-leaf fig", "Fiddle-leaf fig", Utc::now(), 1.2);
        assert!(!record.is_correct);
    }

    #[test]
    fn negative_answer_time_clamps_to_zero() {
        let record = AnswerRecord::graded("aloe-vera", "a", "a", Utc::now(), -3.0);
        assert_eq!(record.time_to_answer, 0.0);
    }
}
