use std::sync::Arc;

use crate::config::GameConfig;
use crate::storage::{InMemoryStore, ScoreStore, TimerStateStore};
use crate::utils::clock::Clock;

pub mod anticheat_service;
pub mod scoring_service;
pub mod session_service;
pub mod timer_service;
pub mod trophy_service;

/// Composition root. Every component takes its collaborators explicitly;
/// there is no global registry behind this struct.
pub struct GameServices {
    pub sessions: session_service::SessionService,
}

impl GameServices {
    pub fn new(
        config: GameConfig,
        clock: Arc<dyn Clock>,
        timer_store: Arc<dyn TimerStateStore>,
        score_store: Arc<dyn ScoreStore>,
    ) -> Self {
        Self {
            sessions: session_service::SessionService::new(
                config,
                clock,
                timer_store,
                score_store,
            ),
        }
    }

    /// Wire everything against a single in-memory store, the default for
    /// tests and the session simulator.
    pub fn with_in_memory_store(config: GameConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(InMemoryStore::with_capacity(config.leaderboard_capacity));
        Self::new(config, clock, store.clone(), store)
    }
}
