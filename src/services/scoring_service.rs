use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::models::score::{BeatTheClockScore, ScoreRecord, SpeedrunScore};
use crate::models::GameSession;
use crate::storage::ScoreStore;

/// Guards the points-per-second division for sessions that somehow report
/// zero elapsed time.
const EPSILON_SECONDS: f64 = 0.001;

/// Speedrun rating shape: accuracy scaled to a 0..=1000 band, discounted by
/// completion time against a fixed reference, minus a per-question penalty
/// for unfinished runs. Monotonic in accuracy and in (negated) time.
const RATING_SCALE: f64 = 1000.0;
const RATING_TIME_REFERENCE: f64 = 300.0;
const SHORTFALL_PENALTY: f64 = 25.0;

/// Score a completed Beat the Clock session. `round_duration` caps the time
/// metric so an overrun cannot inflate the rate denominator.
pub fn beat_the_clock_score(
    session: &GameSession,
    round_duration: f64,
    achieved_at: DateTime<Utc>,
) -> BeatTheClockScore {
    let time_used = session.total_game_time.clamp(0.0, round_duration);
    let points_per_second = session.correct_answers as f64 / time_used.max(EPSILON_SECONDS);

    BeatTheClockScore {
        difficulty: session.difficulty,
        correct_answers: session.correct_answers,
        total_answers: session.questions_answered,
        time_used,
        accuracy: session.accuracy(),
        points_per_second,
        achieved_at,
        is_new_record: false,
    }
}

/// Score a completed Speedrun session against its target question count.
pub fn speedrun_score(
    session: &GameSession,
    target_questions: u32,
    achieved_at: DateTime<Utc>,
) -> SpeedrunScore {
    let completion_time = session.total_game_time.max(0.0);
    let shortfall = target_questions.saturating_sub(session.questions_answered) as f64;

    let rating = (session.accuracy() * RATING_SCALE * RATING_TIME_REFERENCE
        / (RATING_TIME_REFERENCE + completion_time)
        - SHORTFALL_PENALTY * shortfall)
        .max(0.0);

    SpeedrunScore {
        difficulty: session.difficulty,
        correct_answers: session.correct_answers,
        total_questions: target_questions,
        completion_time,
        accuracy: session.accuracy(),
        rating,
        achieved_at,
        is_new_record: false,
    }
}

/// Personal-best and leaderboard bookkeeping on top of the pure calculators.
pub struct ScoringService {
    store: Arc<dyn ScoreStore>,
}

impl ScoringService {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self { store }
    }

    /// Persist a score: stamp `is_new_record` against the stored personal
    /// best (a missing best means the first score always sets the record),
    /// update the best on strict improvement, and submit to the leaderboard
    /// unless the caller withheld it.
    pub async fn record_score(
        &self,
        mut score: ScoreRecord,
        submit_to_leaderboard: bool,
    ) -> Result<ScoreRecord> {
        let previous_best = self
            .store
            .load_personal_best(score.mode(), score.difficulty())
            .await
            .context("Failed to load personal best")?;

        let is_new_record = match &previous_best {
            Some(best) => score.beats(best),
            None => true,
        };
        score.set_new_record(is_new_record);

        if is_new_record {
            self.store
                .save_personal_best(&score)
                .await
                .context("Failed to save personal best")?;
            tracing::info!(
                "New personal best: mode={}, difficulty={}",
                score.mode().as_str(),
                score.difficulty().as_str()
            );
        }

        if submit_to_leaderboard {
            self.store
                .submit_score(&score)
                .await
                .context("Failed to submit score to leaderboard")?;
        } else {
            tracing::warn!(
                "Score withheld from leaderboard: mode={}, difficulty={}",
                score.mode().as_str(),
                score.difficulty().as_str()
            );
        }

        Ok(score)
    }

    pub async fn personal_best(
        &self,
        mode: crate::models::GameMode,
        difficulty: crate::models::Difficulty,
    ) -> Result<Option<ScoreRecord>> {
        self.store
            .load_personal_best(mode, difficulty)
            .await
            .context("Failed to load personal best")
    }

    pub async fn leaderboard(
        &self,
        mode: crate::models::GameMode,
        difficulty: crate::models::Difficulty,
    ) -> Result<Vec<ScoreRecord>> {
        self.store
            .load_leaderboard(mode, difficulty)
            .await
            .context("Failed to load leaderboard")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, GameMode};

    fn finished_session(
        mode: GameMode,
        correct: u32,
        answered: u32,
        total_game_time: f64,
    ) -> GameSession {
        let mut session = GameSession::new(mode, Difficulty::Medium, Utc::now());
        session.correct_answers = correct;
        session.questions_answered = answered;
        session.total_game_time = total_game_time;
        session
    }

    #[test]
    fn beat_the_clock_rate_uses_capped_time() {
        let session = finished_session(GameMode::BeatTheClock, 20, 20, 75.0);
        let score = beat_the_clock_score(&session, 60.0, Utc::now());

        assert_eq!(score.time_used, 60.0);
        assert!((score.points_per_second - 20.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn zero_time_session_does_not_divide_by_zero() {
        let session = finished_session(GameMode::BeatTheClock, 3, 3, 0.0);
        let score = beat_the_clock_score(&session, 60.0, Utc::now());
        assert!(score.points_per_second.is_finite());
    }

    #[test]
    fn speedrun_shortfall_lowers_rating() {
        // Same per-question accuracy and time; the only difference is five
        // unanswered questions.
        let full = finished_session(GameMode::Speedrun, 25, 25, 100.0);
        let short = finished_session(GameMode::Speedrun, 20, 20, 100.0);

        let full_score = speedrun_score(&full, 25, Utc::now());
        let short_score = speedrun_score(&short, 25, Utc::now());
        assert!(full_score.rating > short_score.rating);
    }

    #[test]
    fn speedrun_rating_never_negative() {
        let session = finished_session(GameMode::Speedrun, 0, 1, 400.0);
        let score = speedrun_score(&session, 25, Utc::now());
        assert_eq!(score.rating, 0.0);
    }
}
