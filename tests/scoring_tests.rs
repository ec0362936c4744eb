use std::sync::Arc;

use chrono::Utc;

use floraquiz_core::models::score::ScoreRecord;
use floraquiz_core::models::{Difficulty, GameMode, GameSession};
use floraquiz_core::services::scoring_service::{
    beat_the_clock_score, speedrun_score, ScoringService,
};
use floraquiz_core::storage::{InMemoryStore, ScoreStore};

fn finished_session(
    mode: GameMode,
    difficulty: Difficulty,
    correct: u32,
    answered: u32,
    total_game_time: f64,
) -> GameSession {
    let mut session = GameSession::new(mode, difficulty, Utc::now());
    session.correct_answers = correct;
    session.questions_answered = answered;
    session.total_game_time = total_game_time;
    session
}

#[test]
fn beat_the_clock_twenty_correct_in_sixty_seconds() {
    let session = finished_session(GameMode::BeatTheClock, Difficulty::Medium, 20, 20, 60.0);
    let score = beat_the_clock_score(&session, 60.0, Utc::now());

    assert_eq!(score.accuracy, 1.0);
    assert!((score.points_per_second - 0.333).abs() < 0.001);
    assert_eq!(score.time_used, 60.0);
    assert_eq!(score.correct_answers, 20);
    assert_eq!(score.total_answers, 20);
}

#[test]
fn accuracy_stays_in_unit_interval_across_counter_grid() {
    for answered in 0u32..=30 {
        for correct in 0..=answered {
            let session = finished_session(
                GameMode::Speedrun,
                Difficulty::Hard,
                correct,
                answered,
                60.0,
            );
            let accuracy = session.accuracy();
            assert!(
                (0.0..=1.0).contains(&accuracy),
                "accuracy {} out of range for {}/{}",
                accuracy,
                correct,
                answered
            );
        }
    }
}

#[test]
fn speedrun_perfect_run_outranks_near_miss() {
    let perfect = finished_session(GameMode::Speedrun, Difficulty::Medium, 25, 25, 85.0);
    let near_miss = finished_session(GameMode::Speedrun, Difficulty::Medium, 24, 25, 90.0);

    let perfect_score = speedrun_score(&perfect, 25, Utc::now());
    let near_miss_score = speedrun_score(&near_miss, 25, Utc::now());

    assert!(perfect_score.rating > near_miss_score.rating);
}

#[test]
fn speedrun_rating_monotonic_in_accuracy_and_time() {
    let base = finished_session(GameMode::Speedrun, Difficulty::Medium, 20, 25, 100.0);
    let sharper = finished_session(GameMode::Speedrun, Difficulty::Medium, 22, 25, 100.0);
    let faster = finished_session(GameMode::Speedrun, Difficulty::Medium, 20, 25, 80.0);

    let base_rating = speedrun_score(&base, 25, Utc::now()).rating;
    assert!(speedrun_score(&sharper, 25, Utc::now()).rating > base_rating);
    assert!(speedrun_score(&faster, 25, Utc::now()).rating > base_rating);
}

#[tokio::test]
async fn first_score_is_always_a_new_record() {
    let store = Arc::new(InMemoryStore::new());
    let scoring = ScoringService::new(store);

    let session = finished_session(GameMode::BeatTheClock, Difficulty::Medium, 10, 12, 60.0);
    let score = ScoreRecord::BeatTheClock(beat_the_clock_score(&session, 60.0, Utc::now()));

    let recorded = scoring.record_score(score, true).await.unwrap();
    assert!(recorded.is_new_record());
}

#[tokio::test]
async fn personal_best_never_regresses() {
    let store = Arc::new(InMemoryStore::new());
    let scoring = ScoringService::new(store.clone());

    let better = finished_session(GameMode::BeatTheClock, Difficulty::Medium, 18, 20, 60.0);
    let worse = finished_session(GameMode::BeatTheClock, Difficulty::Medium, 11, 20, 60.0);

    let better_score =
        ScoreRecord::BeatTheClock(beat_the_clock_score(&better, 60.0, Utc::now()));
    let worse_score = ScoreRecord::BeatTheClock(beat_the_clock_score(&worse, 60.0, Utc::now()));

    scoring.record_score(better_score, true).await.unwrap();
    let recorded_worse = scoring.record_score(worse_score, true).await.unwrap();
    assert!(!recorded_worse.is_new_record());

    let best = store
        .load_personal_best(GameMode::BeatTheClock, Difficulty::Medium)
        .await
        .unwrap()
        .expect("personal best should exist");
    match best {
        ScoreRecord::BeatTheClock(score) => assert_eq!(score.correct_answers, 18),
        _ => panic!("wrong mode stored"),
    }
}

#[tokio::test]
async fn strictly_better_score_updates_the_best() {
    let store = Arc::new(InMemoryStore::new());
    let scoring = ScoringService::new(store.clone());

    for correct in [10u32, 15, 20] {
        let session =
            finished_session(GameMode::BeatTheClock, Difficulty::Hard, correct, 20, 45.0);
        let score = ScoreRecord::BeatTheClock(beat_the_clock_score(&session, 45.0, Utc::now()));
        let recorded = scoring.record_score(score, true).await.unwrap();
        assert!(recorded.is_new_record());
    }
}

#[tokio::test]
async fn tied_correct_count_does_not_update_the_best() {
    let store = Arc::new(InMemoryStore::new());
    let scoring = ScoringService::new(store);

    let first = finished_session(GameMode::BeatTheClock, Difficulty::Easy, 12, 15, 80.0);
    let tied = finished_session(GameMode::BeatTheClock, Difficulty::Easy, 12, 12, 70.0);

    let first_score = ScoreRecord::BeatTheClock(beat_the_clock_score(&first, 90.0, Utc::now()));
    let tied_score = ScoreRecord::BeatTheClock(beat_the_clock_score(&tied, 90.0, Utc::now()));

    scoring.record_score(first_score, true).await.unwrap();
    let recorded = scoring.record_score(tied_score, true).await.unwrap();
    assert!(!recorded.is_new_record());
}

#[tokio::test]
async fn speedrun_best_tracks_rating_not_correct_count() {
    let store = Arc::new(InMemoryStore::new());
    let scoring = ScoringService::new(store);

    // Fewer correct answers but much faster: higher rating.
    let slow_perfect = finished_session(GameMode::Speedrun, Difficulty::Medium, 25, 25, 280.0);
    let quick_near = finished_session(GameMode::Speedrun, Difficulty::Medium, 24, 25, 70.0);

    let slow_score = ScoreRecord::Speedrun(speedrun_score(&slow_perfect, 25, Utc::now()));
    let quick_score = ScoreRecord::Speedrun(speedrun_score(&quick_near, 25, Utc::now()));

    scoring.record_score(slow_score, true).await.unwrap();
    let recorded = scoring.record_score(quick_score, true).await.unwrap();
    assert!(recorded.is_new_record());
}

#[tokio::test]
async fn leaderboard_orders_by_mode_ranking_rule() {
    let store = Arc::new(InMemoryStore::new());
    let scoring = ScoringService::new(store);

    for (correct, answered, time) in [(8u32, 10u32, 60.0), (14, 20, 60.0), (11, 11, 55.0)] {
        let session =
            finished_session(GameMode::BeatTheClock, Difficulty::Medium, correct, answered, time);
        let score = ScoreRecord::BeatTheClock(beat_the_clock_score(&session, 60.0, Utc::now()));
        scoring.record_score(score, true).await.unwrap();
    }

    let board = scoring
        .leaderboard(GameMode::BeatTheClock, Difficulty::Medium)
        .await
        .unwrap();
    let counts: Vec<u32> = board
        .iter()
        .map(|record| match record {
            ScoreRecord::BeatTheClock(score) => score.correct_answers,
            _ => panic!("wrong mode on board"),
        })
        .collect();
    assert_eq!(counts, vec![14, 11, 8]);
}

#[tokio::test]
async fn withheld_scores_stay_off_the_leaderboard_but_keep_the_best() {
    let store = Arc::new(InMemoryStore::new());
    let scoring = ScoringService::new(store);

    let session = finished_session(GameMode::Speedrun, Difficulty::Medium, 25, 25, 85.0);
    let score = ScoreRecord::Speedrun(speedrun_score(&session, 25, Utc::now()));

    let recorded = scoring.record_score(score, false).await.unwrap();
    assert!(recorded.is_new_record());

    let board = scoring
        .leaderboard(GameMode::Speedrun, Difficulty::Medium)
        .await
        .unwrap();
    assert!(board.is_empty());
}
