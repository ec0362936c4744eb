//! Scripted end-to-end session run against the real clock. Useful for
//! eyeballing lifecycle logs and the reward math without a UI on top.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use floraquiz_core::models::{Difficulty, GameMode};
use floraquiz_core::services::timer_service::timer_event_stream;
use floraquiz_core::{GameConfig, GameServices};

// A short scripted quiz: (plant, player's answer, expected answer).
const SCRIPT: &[(&str, &str, &str)] = &[
    ("monstera-deliciosa", "Swiss cheese plant", "Swiss cheese plant"),
    ("ficus-lyrata", "Fiddle-leaf fig", "Fiddle-leaf fig"),
    ("pilea-peperomioides", "Rubber plant", "Chinese money plant"),
    ("aloe-barbadensis", "Aloe vera", "Aloe vera"),
    ("epipremnum-aureum", "Golden pothos", "Golden pothos"),
    ("sansevieria-trifasciata", "Snake plant", "Snake plant"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "floraquiz_core=debug,session_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GameConfig::load().expect("Failed to load configuration");
    let clock = Arc::new(floraquiz_core::utils::clock::SystemClock);
    let services = GameServices::with_in_memory_store(config, clock);

    tracing::info!("Starting scripted Beat the Clock session");

    let (mut session, timer) = services
        .sessions
        .start_session(GameMode::BeatTheClock, Difficulty::Medium);
    let timer = Arc::new(Mutex::new(timer));

    // Drain timer events in the background the way a UI layer would.
    let tick_interval_ms = services.sessions.config().tick_interval_ms;
    let mut events = Box::pin(timer_event_stream(
        timer.clone(),
        session.id.clone(),
        tick_interval_ms,
    ));
    let event_task = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            tracing::debug!("timer event: {}", event.to_json());
        }
    });

    for (i, (subject, selected, expected)) in SCRIPT.iter().enumerate() {
        // Answer at a believable pace, or the validator flags the run.
        tokio::time::sleep(std::time::Duration::from_millis(1200)).await;
        let outcome = {
            let mut timer = timer.lock().await;
            services
                .sessions
                .submit_answer(&mut session, &mut timer, subject, selected, expected, 1.2)
        };
        tracing::info!(
            "answered {}: correct={}, {}/{} so far",
            subject,
            outcome.is_correct,
            outcome.correct_answers,
            outcome.questions_answered
        );

        // Periodic checkpoint cadence, compressed for the demo.
        if i % 2 == 1 {
            let timer = timer.lock().await;
            services.sessions.checkpoint(&session, &timer).await?;
        }
    }

    // Take a breather mid-round to exercise pause, checkpoint and resume.
    {
        let mut timer = timer.lock().await;
        services.sessions.pause_session(&mut session, &mut timer).await;
    }
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    {
        let mut timer = timer.lock().await;
        services.sessions.resume_session(&mut session, &mut timer);
    }

    let outcome = {
        let mut timer = timer.lock().await;
        services
            .sessions
            .complete_session(&mut session, &mut timer)
            .await?
    };
    event_task.await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
