use serde::Deserialize;
use std::env;

use crate::models::Difficulty;

/// Gameplay tunables. `GameConfig::default()` is the authoritative constant
/// table; `load()` layers optional `config/{APP_ENV}.toml` values and
/// `GAME__`-prefixed environment overrides on top of it.
#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    /// Target question count that completes a Speedrun session.
    pub speedrun_target_questions: u32,
    /// Hard ceiling on plausible Speedrun duration, in seconds.
    pub speedrun_time_ceiling_seconds: f64,
    /// Completing the Speedrun target faster than this earns the speed bonus.
    pub speedrun_speed_bonus_seconds: f64,
    /// Baseline Speedrun completion time; finishing under 1.5x of it earns
    /// the full completion bonus.
    pub speedrun_baseline_seconds: f64,
    /// Beat-the-Clock sessions reporting more than `round * factor` elapsed
    /// seconds are flagged as excessive.
    pub overrun_factor: f64,
    /// Cadence of the timer event stream.
    pub tick_interval_ms: u64,
    /// Cadence of periodic timer checkpoints.
    pub checkpoint_interval_seconds: u64,
    /// Leaderboards keep at most this many entries per (mode, difficulty).
    pub leaderboard_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            speedrun_target_questions: 25,
            speedrun_time_ceiling_seconds: 3600.0,
            speedrun_speed_bonus_seconds: 90.0,
            speedrun_baseline_seconds: 120.0,
            overrun_factor: 1.5,
            tick_interval_ms: 1000,
            checkpoint_interval_seconds: 15,
            leaderboard_capacity: 50,
        }
    }
}

impl GameConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        let settings = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            .add_source(config::Environment::with_prefix("GAME").separator("__"))
            .build()?;

        let defaults = Self::default();

        Ok(Self {
            speedrun_target_questions: settings
                .get_int("session.speedrun_target_questions")
                .map(|v| v.max(1) as u32)
                .unwrap_or(defaults.speedrun_target_questions),
            speedrun_time_ceiling_seconds: settings
                .get_float("anticheat.speedrun_time_ceiling_seconds")
                .unwrap_or(defaults.speedrun_time_ceiling_seconds),
            speedrun_speed_bonus_seconds: settings
                .get_float("trophies.speedrun_speed_bonus_seconds")
                .unwrap_or(defaults.speedrun_speed_bonus_seconds),
            speedrun_baseline_seconds: settings
                .get_float("trophies.speedrun_baseline_seconds")
                .unwrap_or(defaults.speedrun_baseline_seconds),
            overrun_factor: settings
                .get_float("anticheat.overrun_factor")
                .unwrap_or(defaults.overrun_factor),
            tick_interval_ms: settings
                .get_int("session.tick_interval_ms")
                .ok()
                .and_then(|v| u64::try_from(v).ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.tick_interval_ms),
            checkpoint_interval_seconds: settings
                .get_int("session.checkpoint_interval_seconds")
                .ok()
                .and_then(|v| u64::try_from(v).ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.checkpoint_interval_seconds),
            leaderboard_capacity: settings
                .get_int("session.leaderboard_capacity")
                .ok()
                .and_then(|v| usize::try_from(v).ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.leaderboard_capacity),
        })
    }

    /// Beat-the-Clock round length per difficulty, in seconds.
    pub fn round_duration_seconds(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Easy => 90.0,
            Difficulty::Medium => 60.0,
            Difficulty::Hard => 45.0,
            Difficulty::Expert => 30.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn load_without_overrides_matches_defaults() {
        std::env::remove_var("GAME__SESSION__SPEEDRUN_TARGET_QUESTIONS");
        let loaded = GameConfig::load().expect("config should load");
        let defaults = GameConfig::default();
        assert_eq!(
            loaded.speedrun_target_questions,
            defaults.speedrun_target_questions
        );
        assert_eq!(loaded.leaderboard_capacity, defaults.leaderboard_capacity);
    }

    #[test]
    #[serial]
    fn env_override_wins_over_default() {
        std::env::set_var("GAME__SESSION__SPEEDRUN_TARGET_QUESTIONS", "10");
        let loaded = GameConfig::load().expect("config should load");
        assert_eq!(loaded.speedrun_target_questions, 10);
        std::env::remove_var("GAME__SESSION__SPEEDRUN_TARGET_QUESTIONS");
    }

    #[test]
    fn round_durations_shrink_with_difficulty() {
        let cfg = GameConfig::default();
        assert!(
            cfg.round_duration_seconds(Difficulty::Easy)
                > cfg.round_duration_seconds(Difficulty::Medium)
        );
        assert!(
            cfg.round_duration_seconds(Difficulty::Medium)
                > cfg.round_duration_seconds(Difficulty::Hard)
        );
        assert!(
            cfg.round_duration_seconds(Difficulty::Hard)
                > cfg.round_duration_seconds(Difficulty::Expert)
        );
        assert_eq!(cfg.round_duration_seconds(Difficulty::Medium), 60.0);
    }
}
