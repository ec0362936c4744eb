use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Difficulty, GameMode};

/// Result of a completed Beat the Clock round. Ranked by raw correct-answer
/// count; accuracy and time used only break ties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeatTheClockScore {
    pub difficulty: Difficulty,
    pub correct_answers: u32,
    pub total_answers: u32,
    /// Seconds of play, capped at the configured round duration.
    pub time_used: f64,
    pub accuracy: f64,
    pub points_per_second: f64,
    pub achieved_at: DateTime<Utc>,
    pub is_new_record: bool,
}

/// Result of a completed Speedrun. Ranked by the composite rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedrunScore {
    pub difficulty: Difficulty,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub completion_time: f64,
    pub accuracy: f64,
    pub rating: f64,
    pub achieved_at: DateTime<Utc>,
    pub is_new_record: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScoreRecord {
    BeatTheClock(BeatTheClockScore),
    Speedrun(SpeedrunScore),
}

impl ScoreRecord {
    pub fn mode(&self) -> GameMode {
        match self {
            ScoreRecord::BeatTheClock(_) => GameMode::BeatTheClock,
            ScoreRecord::Speedrun(_) => GameMode::Speedrun,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        match self {
            ScoreRecord::BeatTheClock(score) => score.difficulty,
            ScoreRecord::Speedrun(score) => score.difficulty,
        }
    }

    pub fn achieved_at(&self) -> DateTime<Utc> {
        match self {
            ScoreRecord::BeatTheClock(score) => score.achieved_at,
            ScoreRecord::Speedrun(score) => score.achieved_at,
        }
    }

    pub fn is_new_record(&self) -> bool {
        match self {
            ScoreRecord::BeatTheClock(score) => score.is_new_record,
            ScoreRecord::Speedrun(score) => score.is_new_record,
        }
    }

    pub fn set_new_record(&mut self, flag: bool) {
        match self {
            ScoreRecord::BeatTheClock(score) => score.is_new_record = flag,
            ScoreRecord::Speedrun(score) => score.is_new_record = flag,
        }
    }

    /// Strict "better than" under the mode's ranking rule. Ties never count
    /// as an improvement, so personal bests only move forward.
    pub fn beats(&self, other: &ScoreRecord) -> bool {
        match (self, other) {
            (ScoreRecord::BeatTheClock(a), ScoreRecord::BeatTheClock(b)) => {
                a.correct_answers > b.correct_answers
            }
            (ScoreRecord::Speedrun(a), ScoreRecord::Speedrun(b)) => a.rating > b.rating,
            _ => false,
        }
    }

    /// Leaderboard ordering: does `self` sort above `other`?
    pub fn ranks_above(&self, other: &ScoreRecord) -> bool {
        match (self, other) {
            (ScoreRecord::BeatTheClock(a), ScoreRecord::BeatTheClock(b)) => {
                if a.correct_answers != b.correct_answers {
                    return a.correct_answers > b.correct_answers;
                }
                if a.accuracy != b.accuracy {
                    return a.accuracy > b.accuracy;
                }
                a.time_used < b.time_used
            }
            (ScoreRecord::Speedrun(a), ScoreRecord::Speedrun(b)) => a.rating > b.rating,
            _ => false,
        }
    }
}
