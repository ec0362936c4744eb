use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Difficulty, GameMode};

/// Output of one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    /// Seconds elapsed since start, pauses excluded.
    pub total_time: f64,
    /// Countdown seconds left for Beat the Clock; 0.0 for Speedrun.
    pub time_remaining: f64,
    /// Cumulative pause duration in seconds.
    pub paused_time: f64,
    pub is_expired: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TimerEvent {
    TimerTick(TimerTick),
    TimeExpired(TimeExpired),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimerTick {
    pub session_id: String,
    pub total_time: f64,
    pub time_remaining: f64,
    pub paused_time: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimeExpired {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl TimerEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            TimerEvent::TimerTick(_) => "timer-tick",
            TimerEvent::TimeExpired(_) => "time-expired",
        }
    }
}

/// Durable timer checkpoint, written on pause and on a periodic cadence.
///
/// For a record saved while active, `now - started_at - total_paused_time`
/// reproduces the elapsed time the session would have accrued had it kept
/// running, which is what recovery relies on after a process restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerPersistenceRecord {
    pub session_id: String,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub started_at: DateTime<Utc>,
    pub total_paused_time: f64,
    pub was_active: bool,
    pub saved_at: DateTime<Utc>,
    pub questions_answered: u32,
    pub correct_answers: u32,
}
