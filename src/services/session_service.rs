use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::GameConfig;
use crate::models::answer::AnswerRecord;
use crate::models::anticheat::ValidationResult;
use crate::models::score::ScoreRecord;
use crate::models::trophy::TrophyReward;
use crate::models::{GameMode, GameSession, SessionState};
use crate::services::anticheat_service;
use crate::services::scoring_service::{
    beat_the_clock_score, speedrun_score, ScoringService,
};
use crate::services::timer_service::{GameTimer, TimerPhase};
use crate::services::trophy_service;
use crate::storage::{ScoreStore, TimerStateStore};
use crate::utils::clock::Clock;
use crate::utils::retry::{retry_with_backoff, RetryConfig};

/// Outcome of submitting one answer.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub questions_answered: u32,
    pub correct_answers: u32,
    /// True once a Speedrun session has exhausted its question target and
    /// should be routed to completion.
    pub target_reached: bool,
}

/// Everything a finished session produces.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    pub score: ScoreRecord,
    pub reward: TrophyReward,
    pub validation: ValidationResult,
}

/// Owns the full session lifecycle: start, answers, pause/checkpoint,
/// recovery after restart, and completion routing through the validator,
/// the score calculators and the trophy calculator.
pub struct SessionService {
    config: GameConfig,
    clock: Arc<dyn Clock>,
    timer_store: Arc<dyn TimerStateStore>,
    scoring: ScoringService,
}

impl SessionService {
    pub fn new(
        config: GameConfig,
        clock: Arc<dyn Clock>,
        timer_store: Arc<dyn TimerStateStore>,
        score_store: Arc<dyn ScoreStore>,
    ) -> Self {
        Self {
            config,
            clock,
            timer_store,
            scoring: ScoringService::new(score_store),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scoring(&self) -> &ScoringService {
        &self.scoring
    }

    pub fn start_session(
        &self,
        mode: GameMode,
        difficulty: crate::models::Difficulty,
    ) -> (GameSession, GameTimer) {
        let session = GameSession::new(mode, difficulty, self.clock.now());
        let mut timer = GameTimer::new(self.clock.clone(), mode);
        let duration = match mode {
            GameMode::BeatTheClock => Some(self.config.round_duration_seconds(difficulty)),
            GameMode::Speedrun => None,
        };
        timer.start(duration);

        tracing::info!(
            "Session started: id={}, mode={}, difficulty={}",
            session.id,
            mode.as_str(),
            difficulty.as_str()
        );
        (session, timer)
    }

    /// Grade and record one answer, syncing session time from the timer.
    /// Answers landing on a completed session are ignored.
    pub fn submit_answer(
        &self,
        session: &mut GameSession,
        timer: &mut GameTimer,
        subject_id: &str,
        selected: &str,
        expected: &str,
        time_to_answer: f64,
    ) -> AnswerOutcome {
        let record =
            AnswerRecord::graded(subject_id, selected, expected, self.clock.now(), time_to_answer);
        let is_correct = record.is_correct;
        session.record_answer(record);
        session.apply_snapshot(&timer.snapshot());

        let target_reached = session.mode == GameMode::Speedrun
            && session.questions_answered >= self.config.speedrun_target_questions;
        if target_reached && timer.phase() != TimerPhase::Completed {
            timer.finish();
            session.apply_snapshot(&timer.snapshot());
            tracing::info!(
                "Speedrun target reached: session={}, time={:.1}s",
                session.id,
                session.total_game_time
            );
        }

        AnswerOutcome {
            is_correct,
            questions_answered: session.questions_answered,
            correct_answers: session.correct_answers,
            target_reached,
        }
    }

    /// Pause play and checkpoint. A failed checkpoint degrades recovery
    /// fidelity but never interrupts the session.
    pub async fn pause_session(&self, session: &mut GameSession, timer: &mut GameTimer) {
        timer.pause();
        if timer.is_paused() {
            session.state = SessionState::Paused;
            session.apply_snapshot(&timer.snapshot());
            if let Err(err) = self.checkpoint(session, timer).await {
                tracing::warn!(
                    "Checkpoint on pause failed, continuing in memory: session={}, error={:#}",
                    session.id,
                    err
                );
            }
        }
    }

    pub fn resume_session(&self, session: &mut GameSession, timer: &mut GameTimer) {
        timer.resume();
        if timer.is_running() {
            session.state = SessionState::Active;
            session.apply_snapshot(&timer.snapshot());
        }
    }

    /// Write the current timer state. Called on every pause and on the
    /// periodic checkpoint cadence.
    pub async fn checkpoint(&self, session: &GameSession, timer: &GameTimer) -> Result<()> {
        let Some(record) = timer.checkpoint_record(session) else {
            return Ok(());
        };

        retry_with_backoff(RetryConfig::persistent(), || async {
            self.timer_store.save_timer_state(&record).await
        })
        .await
        .context("Failed to save timer checkpoint")?;

        tracing::debug!(
            "Checkpoint written: session={}, was_active={}",
            record.session_id,
            record.was_active
        );
        Ok(())
    }

    /// Rebuild an interrupted session from its last checkpoint. Answer
    /// history does not survive a restart; only the counters do.
    pub async fn recover_session(
        &self,
        session_id: &str,
    ) -> Result<Option<(GameSession, GameTimer)>> {
        let Some(record) = self
            .timer_store
            .load_timer_state(session_id)
            .await
            .context("Failed to load timer checkpoint")?
        else {
            return Ok(None);
        };

        let duration = match record.mode {
            GameMode::BeatTheClock => {
                Some(self.config.round_duration_seconds(record.difficulty))
            }
            GameMode::Speedrun => None,
        };
        let timer = GameTimer::restore(self.clock.clone(), &record, duration);

        let mut session = GameSession::new(record.mode, record.difficulty, record.started_at);
        session.id = record.session_id.clone();
        session.questions_answered = record.questions_answered;
        session.correct_answers = record.correct_answers;
        session.state = if record.was_active {
            SessionState::Active
        } else {
            SessionState::Paused
        };
        session.apply_snapshot(&timer.snapshot());

        tracing::info!(
            "Session recovered: id={}, mode={}, elapsed={:.1}s",
            session.id,
            record.mode.as_str(),
            session.total_game_time
        );
        Ok(Some((session, timer)))
    }

    /// Finish the session: validate the final snapshot, score it, award
    /// trophies, update personal best and leaderboard, drop the checkpoint.
    ///
    /// A flagged session is clamped to the validator's corrected time and
    /// kept off the leaderboard, but the player still gets a score and a
    /// reward; rejecting outright is a caller policy this crate does not
    /// impose.
    pub async fn complete_session(
        &self,
        session: &mut GameSession,
        timer: &mut GameTimer,
    ) -> Result<SessionOutcome> {
        if timer.phase() != TimerPhase::Completed {
            timer.finish();
        }
        let snapshot = timer.snapshot();
        session.apply_snapshot(&snapshot);

        let validation = anticheat_service::validate(session, &snapshot, &self.config);
        if let Some(adjusted) = validation.adjusted_time {
            session.total_game_time = adjusted;
        }
        session.state = SessionState::Completed;

        let achieved_at = self.clock.now();
        let score = match session.mode {
            GameMode::BeatTheClock => ScoreRecord::BeatTheClock(beat_the_clock_score(
                session,
                self.config.round_duration_seconds(session.difficulty),
                achieved_at,
            )),
            GameMode::Speedrun => ScoreRecord::Speedrun(speedrun_score(
                session,
                self.config.speedrun_target_questions,
                achieved_at,
            )),
        };

        let score = self
            .scoring
            .record_score(score, validation.is_valid)
            .await
            .context("Failed to record session score")?;

        let reward = trophy_service::calculate_reward(session, &self.config);

        if let Err(err) = retry_with_backoff(RetryConfig::default(), || async {
            self.timer_store.delete_timer_state(&session.id).await
        })
        .await
        {
            tracing::warn!(
                "Failed to delete timer checkpoint after completion: session={}, error={}",
                session.id,
                err
            );
        }

        tracing::info!(
            "Session completed: id={}, mode={}, correct={}/{}, trophies={}",
            session.id,
            session.mode.as_str(),
            session.correct_answers,
            session.questions_answered,
            reward.total_trophies
        );

        Ok(SessionOutcome {
            score,
            reward,
            validation,
        })
    }

    /// Leave the game without scoring: reset the timer, drop the checkpoint.
    pub async fn abandon_session(&self, session: &mut GameSession, timer: &mut GameTimer) {
        timer.stop();
        session.state = SessionState::Completed;
        if let Err(err) = self.timer_store.delete_timer_state(&session.id).await {
            tracing::warn!(
                "Failed to delete checkpoint for abandoned session: id={}, error={}",
                session.id,
                err
            );
        }
        tracing::info!("Session abandoned: id={}", session.id);
    }
}
