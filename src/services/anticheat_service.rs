use crate::config::GameConfig;
use crate::models::anticheat::{ValidationResult, ViolationKind};
use crate::models::timer::TimerSnapshot;
use crate::models::{Difficulty, GameMode, GameSession};

/// Minimum plausible seconds per question. Easier plants are quicker to
/// recognize, so the floor loosens at the low end and tightens upward.
fn min_seconds_per_question(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 0.75,
        Difficulty::Medium => 1.0,
        Difficulty::Hard => 1.25,
        Difficulty::Expert => 1.5,
    }
}

/// Inspect a session plus a timer snapshot for impossible or suspicious
/// timing. Pure: never mutates state, never fails. Rules run in order and
/// all of them get a chance to append a warning; the first corrective value
/// produced wins `adjusted_time`. Callers decide whether to accept the
/// session as-is, clamp it, or keep it off the leaderboard.
pub fn validate(
    session: &GameSession,
    snapshot: &TimerSnapshot,
    config: &GameConfig,
) -> ValidationResult {
    let mut result = ValidationResult::valid();

    // Rule 1: negative time can only come from a rolled-back clock.
    if snapshot.total_time < 0.0 || snapshot.time_remaining < 0.0 {
        result.flag(ViolationKind::ClockManipulation, Some(0.0));
    }

    // Rule 2: elapsed time far beyond what the mode allows.
    let ceiling = match session.mode {
        GameMode::BeatTheClock => {
            config.round_duration_seconds(session.difficulty) * config.overrun_factor
        }
        GameMode::Speedrun => config.speedrun_time_ceiling_seconds,
    };
    if snapshot.total_time > ceiling {
        result.flag(ViolationKind::ExcessiveTime, Some(ceiling));
    }

    // Rule 3: throughput faster than a human can read the question. Covers
    // literal rapid-fire answering and synthetic sessions that report a
    // full question count against almost no elapsed time.
    if session.questions_answered > 0 && snapshot.total_time >= 0.0 {
        let per_question = snapshot.total_time / session.questions_answered.max(1) as f64;
        if per_question < min_seconds_per_question(session.difficulty) {
            result.flag(ViolationKind::RapidFire, None);
        }
    }

    if !result.is_valid {
        tracing::warn!(
            "Session flagged by timing validator: id={}, warnings={:?}, adjusted_time={:?}",
            session.id,
            result.warnings,
            result.adjusted_time
        );
    }

    result
}
