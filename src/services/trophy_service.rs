use crate::config::GameConfig;
use crate::models::answer::AnswerRecord;
use crate::models::trophy::{TrophyBreakdown, TrophyReward};
use crate::models::{Difficulty, GameMode, GameSession};

const BASE_PER_CORRECT_BEAT_THE_CLOCK: u32 = 10;
const BASE_PER_CORRECT_SPEEDRUN: u32 = 8;

/// Accuracy below this earns no accuracy bonus at all.
const ACCURACY_BONUS_THRESHOLD: f64 = 0.5;
const ACCURACY_BONUS_MAX: f64 = 100.0;

/// Streak plateaus: 5/10/15/20 answers, ceiling at 100.
const STREAK_BREAKPOINTS: [(u32, u32); 4] = [(20, 100), (15, 75), (10, 50), (5, 25)];

const SPEED_BONUS: u32 = 50;
const COMPLETION_BONUS_FAST: u32 = 30;
const COMPLETION_BONUS_BASE: u32 = 10;

fn difficulty_multiplier(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 0.8,
        Difficulty::Medium => 1.0,
        Difficulty::Hard => 1.3,
        Difficulty::Expert => 1.6,
    }
}

/// Longest unbroken run of correct answers. Only the single longest run
/// counts; an incorrect answer resets the scan, never the best-so-far.
pub fn longest_streak(answers: &[AnswerRecord]) -> u32 {
    let mut best = 0u32;
    let mut current = 0u32;
    for answer in answers {
        if answer.is_correct {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

fn accuracy_bonus(accuracy: f64) -> u32 {
    if accuracy < ACCURACY_BONUS_THRESHOLD {
        return 0;
    }
    let scale = (accuracy - ACCURACY_BONUS_THRESHOLD) / (1.0 - ACCURACY_BONUS_THRESHOLD);
    (scale * ACCURACY_BONUS_MAX).round() as u32
}

fn streak_bonus(streak: u32) -> u32 {
    for (breakpoint, bonus) in STREAK_BREAKPOINTS {
        if streak >= breakpoint {
            return bonus;
        }
    }
    0
}

/// Convert a completed session into a trophy award.
pub fn calculate_reward(session: &GameSession, config: &GameConfig) -> TrophyReward {
    let base_per_correct = match session.mode {
        GameMode::BeatTheClock => BASE_PER_CORRECT_BEAT_THE_CLOCK,
        GameMode::Speedrun => BASE_PER_CORRECT_SPEEDRUN,
    };
    let base_trophies = session.correct_answers * base_per_correct;

    let accuracy_bonus = accuracy_bonus(session.accuracy());
    let streak_bonus = streak_bonus(longest_streak(&session.answers));

    let target_met = match session.mode {
        // A Beat the Clock round is complete once it has been played out
        // with at least one answer on the board.
        GameMode::BeatTheClock => session.questions_answered > 0,
        GameMode::Speedrun => session.questions_answered >= config.speedrun_target_questions,
    };

    let speed_bonus = match session.mode {
        GameMode::Speedrun
            if target_met && session.total_game_time <= config.speedrun_speed_bonus_seconds =>
        {
            SPEED_BONUS
        }
        _ => 0,
    };

    let completion_bonus = match session.mode {
        GameMode::BeatTheClock if target_met => COMPLETION_BONUS_FAST,
        GameMode::Speedrun if target_met => {
            if session.total_game_time <= config.speedrun_baseline_seconds * 1.5 {
                COMPLETION_BONUS_FAST
            } else {
                COMPLETION_BONUS_BASE
            }
        }
        _ => 0,
    };

    let multiplier = difficulty_multiplier(session.difficulty);
    let component_sum =
        (base_trophies + accuracy_bonus + streak_bonus + speed_bonus + completion_bonus) as f64;
    let final_amount = (component_sum * multiplier).round().max(0.0) as u32;

    tracing::debug!(
        "Trophy reward: session={}, base={}, accuracy={}, streak={}, speed={}, completion={}, multiplier={}, final={}",
        session.id,
        base_trophies,
        accuracy_bonus,
        streak_bonus,
        speed_bonus,
        completion_bonus,
        multiplier,
        final_amount
    );

    TrophyReward {
        total_trophies: final_amount,
        breakdown: TrophyBreakdown {
            base_trophies,
            accuracy_bonus,
            streak_bonus,
            speed_bonus,
            completion_bonus,
            difficulty_multiplier: multiplier,
            final_amount,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn answer(is_correct: bool) -> AnswerRecord {
        AnswerRecord {
            subject_id: "pilea-peperomioides".to_string(),
            selected: "a".to_string(),
            expected: if is_correct { "a" } else { "b" }.to_string(),
            is_correct,
            answered_at: Utc::now(),
            time_to_answer: 2.0,
        }
    }

    #[test]
    fn longest_streak_takes_single_best_run() {
        let answers: Vec<AnswerRecord> = [true, true, false, true, true, true, false, true]
            .into_iter()
            .map(answer)
            .collect();
        assert_eq!(longest_streak(&answers), 3);
    }

    #[test]
    fn streak_bonus_plateaus() {
        assert_eq!(streak_bonus(0), 0);
        assert_eq!(streak_bonus(4), 0);
        assert_eq!(streak_bonus(5), 25);
        assert_eq!(streak_bonus(9), 25);
        assert_eq!(streak_bonus(10), 50);
        assert_eq!(streak_bonus(19), 75);
        assert_eq!(streak_bonus(20), 100);
        assert_eq!(streak_bonus(40), 100);
    }

    #[test]
    fn accuracy_bonus_is_zero_below_threshold_and_full_at_perfect() {
        assert_eq!(accuracy_bonus(0.0), 0);
        assert_eq!(accuracy_bonus(0.49), 0);
        assert_eq!(accuracy_bonus(1.0), 100);
        assert!(accuracy_bonus(0.9) > 0);
        assert!(accuracy_bonus(0.9) < accuracy_bonus(0.95));
    }

    #[test]
    fn multiplier_table_matches_difficulty_order() {
        assert_eq!(difficulty_multiplier(Difficulty::Easy), 0.8);
        assert_eq!(difficulty_multiplier(Difficulty::Medium), 1.0);
        assert_eq!(difficulty_multiplier(Difficulty::Hard), 1.3);
        assert_eq!(difficulty_multiplier(Difficulty::Expert), 1.6);
    }
}
