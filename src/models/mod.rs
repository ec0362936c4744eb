use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod answer;
pub mod anticheat;
pub mod score;
pub mod timer;
pub mod trophy;

use answer::AnswerRecord;
use timer::TimerSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    BeatTheClock,
    Speedrun,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::BeatTheClock => "beat_the_clock",
            GameMode::Speedrun => "speedrun",
        }
    }
}

/// Ordered by increasing challenge; the ordering is relied on by reward
/// multipliers and anti-cheat thresholds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Paused,
    Completed,
}

/// One play-through of a game mode. Mutated by answer submission and timer
/// sync while Active/Paused; immutable once Completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub id: String,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub total_game_time: f64,
    pub total_paused_time: f64,
    pub answers: Vec<AnswerRecord>,
    pub state: SessionState,
    pub started_at: DateTime<Utc>,
}

impl GameSession {
    pub fn new(mode: GameMode, difficulty: Difficulty, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            mode,
            difficulty,
            questions_answered: 0,
            correct_answers: 0,
            total_game_time: 0.0,
            total_paused_time: 0.0,
            answers: Vec::new(),
            state: SessionState::Active,
            started_at,
        }
    }

    /// Append an answer and bump the counters. Ignored once Completed.
    pub fn record_answer(&mut self, answer: AnswerRecord) {
        if self.state == SessionState::Completed {
            tracing::debug!(
                "Ignoring answer for completed session: id={}, subject={}",
                self.id,
                answer.subject_id
            );
            return;
        }
        self.questions_answered += 1;
        if answer.is_correct {
            self.correct_answers += 1;
        }
        self.answers.push(answer);
    }

    /// `correct / answered`, 0.0 before the first answer.
    pub fn accuracy(&self) -> f64 {
        if self.questions_answered == 0 {
            return 0.0;
        }
        self.correct_answers as f64 / self.questions_answered as f64
    }

    /// Sync session time counters from a trusted timer snapshot.
    pub fn apply_snapshot(&mut self, snapshot: &TimerSnapshot) {
        self.total_game_time = snapshot.total_time.max(0.0);
        self.total_paused_time = snapshot.paused_time.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graded(is_correct: bool) -> AnswerRecord {
        AnswerRecord {
            subject_id: "monstera-deliciosa".to_string(),
            selected: "a".to_string(),
            expected: if is_correct { "a" } else { "b" }.to_string(),
            is_correct,
            answered_at: Utc::now(),
            time_to_answer: 2.0,
        }
    }

    #[test]
    fn counters_track_recorded_answers() {
        let mut session = GameSession::new(GameMode::Speedrun, Difficulty::Medium, Utc::now());
        session.record_answer(graded(true));
        session.record_answer(graded(false));
        session.record_answer(graded(true));

        assert_eq!(session.questions_answered, 3);
        assert_eq!(session.correct_answers, 2);
        assert_eq!(session.answers.len(), 3);
    }

    #[test]
    fn accuracy_is_zero_without_answers() {
        let session = GameSession::new(GameMode::BeatTheClock, Difficulty::Easy, Utc::now());
        assert_eq!(session.accuracy(), 0.0);
    }

    #[test]
    fn completed_session_ignores_answers() {
        let mut session = GameSession::new(GameMode::Speedrun, Difficulty::Hard, Utc::now());
        session.state = SessionState::Completed;
        session.record_answer(graded(true));
        assert_eq!(session.questions_answered, 0);
        assert!(session.answers.is_empty());
    }

    #[test]
    fn difficulties_order_by_challenge() {
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(Difficulty::Hard < Difficulty::Expert);
    }
}
