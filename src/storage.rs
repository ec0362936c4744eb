use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::score::ScoreRecord;
use crate::models::timer::TimerPersistenceRecord;
use crate::models::{Difficulty, GameMode};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode record: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Durable home of timer checkpoints. Writes for one session id must be
/// strictly ordered by the caller (last checkpoint wins).
#[async_trait]
pub trait TimerStateStore: Send + Sync {
    async fn save_timer_state(&self, record: &TimerPersistenceRecord) -> Result<(), StorageError>;
    async fn load_timer_state(
        &self,
        session_id: &str,
    ) -> Result<Option<TimerPersistenceRecord>, StorageError>;
    async fn delete_timer_state(&self, session_id: &str) -> Result<(), StorageError>;
}

/// Personal bests and leaderboards, keyed by (mode, difficulty).
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn save_personal_best(&self, record: &ScoreRecord) -> Result<(), StorageError>;
    async fn load_personal_best(
        &self,
        mode: GameMode,
        difficulty: Difficulty,
    ) -> Result<Option<ScoreRecord>, StorageError>;
    /// Insert into the leaderboard, keeping it sorted by the mode's ranking
    /// rule and capped to the store's capacity.
    async fn submit_score(&self, record: &ScoreRecord) -> Result<(), StorageError>;
    async fn load_leaderboard(
        &self,
        mode: GameMode,
        difficulty: Difficulty,
    ) -> Result<Vec<ScoreRecord>, StorageError>;
}

/// Key-value store of JSON payloads. The default backend for tests, the
/// simulator and any host app that brings its own durable layer on top.
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
    leaderboard_capacity: usize,
}

const DEFAULT_LEADERBOARD_CAPACITY: usize = 50;

fn timer_key(session_id: &str) -> String {
    format!("timer:{}", session_id)
}

fn best_key(mode: GameMode, difficulty: Difficulty) -> String {
    format!("best:{}:{}", mode.as_str(), difficulty.as_str())
}

fn board_key(mode: GameMode, difficulty: Difficulty) -> String {
    format!("board:{}:{}", mode.as_str(), difficulty.as_str())
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LEADERBOARD_CAPACITY)
    }

    pub fn with_capacity(leaderboard_capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            leaderboard_capacity: leaderboard_capacity.max(1),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TimerStateStore for InMemoryStore {
    async fn save_timer_state(&self, record: &TimerPersistenceRecord) -> Result<(), StorageError> {
        let payload = serde_json::to_string(record).map_err(StorageError::Encode)?;
        let mut entries = self.entries.write().await;
        entries.insert(timer_key(&record.session_id), payload);
        tracing::debug!("Timer checkpoint saved: session={}", record.session_id);
        Ok(())
    }

    async fn load_timer_state(
        &self,
        session_id: &str,
    ) -> Result<Option<TimerPersistenceRecord>, StorageError> {
        let entries = self.entries.read().await;
        entries
            .get(&timer_key(session_id))
            .map(|payload| serde_json::from_str(payload).map_err(StorageError::Decode))
            .transpose()
    }

    async fn delete_timer_state(&self, session_id: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        entries.remove(&timer_key(session_id));
        Ok(())
    }
}

#[async_trait]
impl ScoreStore for InMemoryStore {
    async fn save_personal_best(&self, record: &ScoreRecord) -> Result<(), StorageError> {
        let payload = serde_json::to_string(record).map_err(StorageError::Encode)?;
        let mut entries = self.entries.write().await;
        entries.insert(best_key(record.mode(), record.difficulty()), payload);
        Ok(())
    }

    async fn load_personal_best(
        &self,
        mode: GameMode,
        difficulty: Difficulty,
    ) -> Result<Option<ScoreRecord>, StorageError> {
        let entries = self.entries.read().await;
        entries
            .get(&best_key(mode, difficulty))
            .map(|payload| serde_json::from_str(payload).map_err(StorageError::Decode))
            .transpose()
    }

    async fn submit_score(&self, record: &ScoreRecord) -> Result<(), StorageError> {
        let key = board_key(record.mode(), record.difficulty());
        let mut entries = self.entries.write().await;

        let mut board: Vec<ScoreRecord> = match entries.get(&key) {
            Some(payload) => serde_json::from_str(payload).map_err(StorageError::Decode)?,
            None => Vec::new(),
        };

        board.push(record.clone());
        board.sort_by(|a, b| {
            if a.ranks_above(b) {
                std::cmp::Ordering::Less
            } else if b.ranks_above(a) {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        });
        board.truncate(self.leaderboard_capacity);

        let payload = serde_json::to_string(&board).map_err(StorageError::Encode)?;
        entries.insert(key, payload);
        Ok(())
    }

    async fn load_leaderboard(
        &self,
        mode: GameMode,
        difficulty: Difficulty,
    ) -> Result<Vec<ScoreRecord>, StorageError> {
        let entries = self.entries.read().await;
        match entries.get(&board_key(mode, difficulty)) {
            Some(payload) => serde_json::from_str(payload).map_err(StorageError::Decode),
            None => Ok(Vec::new()),
        }
    }
}
