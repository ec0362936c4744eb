use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, Stream};
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::models::timer::{
    TimeExpired, TimerEvent, TimerPersistenceRecord, TimerSnapshot, TimerTick,
};
use crate::models::{GameMode, GameSession};
use crate::utils::clock::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Active,
    Paused,
    Completed,
}

/// Pausable stopwatch/countdown driven entirely by an injected clock.
///
/// `Idle -> Active <-> Paused -> Completed`; `stop()` returns to Idle from
/// anywhere. Invalid transitions are silent no-ops: the UI layer above this
/// is allowed to double-tap.
pub struct GameTimer {
    clock: Arc<dyn Clock>,
    mode: GameMode,
    phase: TimerPhase,
    /// Countdown length for Beat the Clock; None while Idle and for Speedrun.
    duration: Option<f64>,
    started_at: Option<DateTime<Utc>>,
    segment_started_at: Option<DateTime<Utc>>,
    /// Active seconds settled before the current segment.
    accumulated: f64,
    paused_total: f64,
    pause_started_at: Option<DateTime<Utc>>,
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

impl GameTimer {
    pub fn new(clock: Arc<dyn Clock>, mode: GameMode) -> Self {
        Self {
            clock,
            mode,
            phase: TimerPhase::Idle,
            duration: None,
            started_at: None,
            segment_started_at: None,
            accumulated: 0.0,
            paused_total: 0.0,
            pause_started_at: None,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Active
    }

    pub fn is_paused(&self) -> bool {
        self.phase == TimerPhase::Paused
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Begin a session. Beat the Clock requires a positive countdown length;
    /// anything else leaves the timer Idle. Speedrun counts up and ignores
    /// the duration argument.
    pub fn start(&mut self, duration: Option<f64>) {
        if self.phase != TimerPhase::Idle {
            tracing::debug!("start() ignored: timer phase is {:?}", self.phase);
            return;
        }

        let duration = match self.mode {
            GameMode::BeatTheClock => match duration {
                Some(d) if d > 0.0 => Some(d),
                _ => {
                    tracing::warn!(
                        "start() rejected: Beat the Clock needs a positive duration, got {:?}",
                        duration
                    );
                    return;
                }
            },
            GameMode::Speedrun => None,
        };

        let now = self.clock.now();
        self.duration = duration;
        self.started_at = Some(now);
        self.segment_started_at = Some(now);
        self.accumulated = 0.0;
        self.paused_total = 0.0;
        self.pause_started_at = None;
        self.phase = TimerPhase::Active;

        tracing::info!(
            "Timer started: mode={}, duration={:?}",
            self.mode.as_str(),
            self.duration
        );
    }

    /// Freeze the elapsed counter. Valid only while Active.
    pub fn pause(&mut self) {
        if self.phase != TimerPhase::Active {
            tracing::debug!("pause() ignored: timer phase is {:?}", self.phase);
            return;
        }
        let now = self.clock.now();
        if let Some(segment) = self.segment_started_at.take() {
            self.accumulated += seconds_between(segment, now);
        }
        self.pause_started_at = Some(now);
        self.phase = TimerPhase::Paused;
    }

    /// Continue counting from where the pause froze the timer. The paused
    /// interval lands in the paused accumulator, not in elapsed time.
    pub fn resume(&mut self) {
        if self.phase != TimerPhase::Paused {
            tracing::debug!("resume() ignored: timer phase is {:?}", self.phase);
            return;
        }
        let now = self.clock.now();
        if let Some(pause_started) = self.pause_started_at.take() {
            self.paused_total += seconds_between(pause_started, now).max(0.0);
        }
        self.segment_started_at = Some(now);
        self.phase = TimerPhase::Active;
    }

    /// Elapsed active seconds. Negative only if the wall clock rolled back,
    /// which the validator is responsible for catching.
    pub fn elapsed(&self) -> f64 {
        let mut elapsed = self.accumulated;
        if let Some(segment) = self.segment_started_at {
            elapsed += seconds_between(segment, self.clock.now());
        }
        elapsed
    }

    pub fn total_paused(&self) -> f64 {
        let mut paused = self.paused_total;
        if let Some(pause_started) = self.pause_started_at {
            paused += seconds_between(pause_started, self.clock.now()).max(0.0);
        }
        paused
    }

    /// Non-mutating view of the current timer values.
    pub fn snapshot(&self) -> TimerSnapshot {
        let total_time = self.elapsed();
        let time_remaining = match self.duration {
            Some(duration) => (duration - total_time).max(0.0),
            None => 0.0,
        };
        let is_expired =
            self.duration.is_some() && self.phase != TimerPhase::Idle && time_remaining <= 0.0;

        TimerSnapshot {
            total_time,
            time_remaining,
            paused_time: self.total_paused(),
            is_expired,
        }
    }

    /// Periodic recompute. While Active, an expired countdown settles the
    /// elapsed counter and completes the timer; the returned snapshot is the
    /// terminal one.
    pub fn tick(&mut self) -> TimerSnapshot {
        let snapshot = self.snapshot();
        if self.phase == TimerPhase::Active && snapshot.is_expired {
            self.settle();
            self.phase = TimerPhase::Completed;
            tracing::info!(
                "Timer expired: mode={}, elapsed={:.1}s",
                self.mode.as_str(),
                snapshot.total_time
            );
        }
        snapshot
    }

    /// Complete the timer from Active or Paused, settling elapsed time. Used
    /// when the Speedrun question count is exhausted or the session ends
    /// manually.
    pub fn finish(&mut self) {
        match self.phase {
            TimerPhase::Active => {
                self.settle();
            }
            TimerPhase::Paused => {
                let now = self.clock.now();
                if let Some(pause_started) = self.pause_started_at.take() {
                    self.paused_total += seconds_between(pause_started, now).max(0.0);
                }
            }
            TimerPhase::Idle | TimerPhase::Completed => return,
        }
        self.phase = TimerPhase::Completed;
    }

    /// Forcibly reset to Idle, clearing all counters ("leave game").
    pub fn stop(&mut self) {
        self.phase = TimerPhase::Idle;
        self.duration = None;
        self.started_at = None;
        self.segment_started_at = None;
        self.accumulated = 0.0;
        self.paused_total = 0.0;
        self.pause_started_at = None;
    }

    /// Manual countdown override. Negative input clamps to 0; setting 0
    /// forces expiry and completion.
    pub fn set_time_remaining(&mut self, value: f64) {
        if self.mode != GameMode::BeatTheClock
            || matches!(self.phase, TimerPhase::Idle | TimerPhase::Completed)
        {
            return;
        }
        let value = value.max(0.0);
        self.duration = Some(self.elapsed() + value);
        if value == 0.0 {
            self.finish();
        }
    }

    /// Extend the countdown. Only positive deltas apply; time cannot be
    /// shortened through this call.
    pub fn add_time(&mut self, delta: f64) {
        if delta <= 0.0 {
            return;
        }
        if let Some(duration) = self.duration.as_mut() {
            *duration += delta;
        }
    }

    fn settle(&mut self) {
        let now = self.clock.now();
        if let Some(segment) = self.segment_started_at.take() {
            self.accumulated += seconds_between(segment, now);
        }
        if let Some(duration) = self.duration {
            // A countdown never settles past its own length.
            self.accumulated = self.accumulated.min(duration);
        }
    }

    /// Checkpoint the timer against its owning session. None while Idle.
    pub fn checkpoint_record(&self, session: &GameSession) -> Option<TimerPersistenceRecord> {
        let started_at = self.started_at?;
        Some(TimerPersistenceRecord {
            session_id: session.id.clone(),
            mode: self.mode,
            difficulty: session.difficulty,
            started_at,
            total_paused_time: self.total_paused(),
            was_active: self.phase == TimerPhase::Active,
            saved_at: self.clock.now(),
            questions_answered: session.questions_answered,
            correct_answers: session.correct_answers,
        })
    }

    /// Rebuild a timer from a checkpoint after a process restart.
    ///
    /// A record saved while active resumes Active with
    /// `elapsed = now - started_at - total_paused_time`, as if the session
    /// had kept running. A record saved while paused re-enters Paused with
    /// elapsed frozen as of `saved_at`, and the gap since then counts as
    /// pause time once the player resumes.
    pub fn restore(
        clock: Arc<dyn Clock>,
        record: &TimerPersistenceRecord,
        duration: Option<f64>,
    ) -> Self {
        let now = clock.now();
        let mut timer = Self::new(clock, record.mode);
        timer.duration = match record.mode {
            GameMode::BeatTheClock => duration,
            GameMode::Speedrun => None,
        };
        timer.started_at = Some(record.started_at);
        timer.paused_total = record.total_paused_time;

        if record.was_active {
            timer.accumulated =
                seconds_between(record.started_at, now) - record.total_paused_time;
            timer.segment_started_at = Some(now);
            timer.phase = TimerPhase::Active;
        } else {
            timer.accumulated =
                seconds_between(record.started_at, record.saved_at) - record.total_paused_time;
            timer.pause_started_at = Some(record.saved_at);
            timer.phase = TimerPhase::Paused;
        }

        tracing::info!(
            "Timer restored: session={}, was_active={}, elapsed={:.1}s",
            record.session_id,
            record.was_active,
            timer.accumulated
        );
        timer
    }
}

/// Stream of timer events, one tick per interval while the timer runs, a
/// single terminal expiry event, then end of stream. Stopping the timer ends
/// the stream; a completed Speedrun timer ends it without an expiry event.
pub fn timer_event_stream(
    timer: Arc<Mutex<GameTimer>>,
    session_id: String,
    tick_interval_ms: u64,
) -> impl Stream<Item = TimerEvent> {
    stream::unfold(
        (timer, session_id, false),
        move |(timer, session_id, expired_sent)| async move {
            if expired_sent {
                return None;
            }

            sleep(Duration::from_millis(tick_interval_ms)).await;

            let (snapshot, phase, timestamp) = {
                let mut guard = timer.lock().await;
                let snapshot = guard.tick();
                (snapshot, guard.phase(), guard.now())
            };

            match phase {
                TimerPhase::Idle => None,
                TimerPhase::Completed if snapshot.is_expired => {
                    let event = TimerEvent::TimeExpired(TimeExpired {
                        session_id: session_id.clone(),
                        timestamp,
                        message: "Time limit exceeded".to_string(),
                    });
                    Some((event, (timer, session_id, true)))
                }
                TimerPhase::Completed => None,
                _ => {
                    let event = TimerEvent::TimerTick(TimerTick {
                        session_id: session_id.clone(),
                        total_time: snapshot.total_time,
                        time_remaining: snapshot.time_remaining,
                        paused_time: snapshot.paused_time,
                        timestamp,
                    });
                    Some((event, (timer, session_id, false)))
                }
            }
        },
    )
}
