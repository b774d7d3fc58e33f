//! Session engine implementation.
//!
//! The engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically and for feeding it pause/resume/stop commands.
//!
//! ## State Transitions
//!
//! ```text
//! Running <-> Breaking -> Complete
//!    ^  \       /
//!    |   Paused           any non-terminal --stop--> Cancelled
//! ```
//!
//! A session is constructed directly in `Running` with the first
//! interval open; there is no idle state. `Complete` and `Cancelled`
//! are terminal: every command and tick afterwards is a no-op.
//!
//! Every method has an explicit-instant `*_at` variant so transitions
//! are deterministic under test; the bare variants read the wall clock.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::events::Event;
use crate::task::{Interval, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Running,
    Breaking,
    Paused,
    Completed,
    Cancelled,
}

impl SessionState {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Cancelled)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Running => "RUNNING",
            SessionState::Breaking => "BREAKING",
            SessionState::Paused => "PAUSED",
            SessionState::Completed => "COMPLETE",
            SessionState::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Immutable point-in-time view of a session, published to the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub state: SessionState,
    /// Elapsed time in the current phase, clamped to `target`.
    pub elapsed: Duration,
    /// Nominal duration of the current phase.
    pub target: Duration,
    pub completed: usize,
    pub target_pomodoros: u32,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Core session state machine.
///
/// Operates on wall-clock deltas -- no internal thread. Elapsed time in
/// the current phase is `banked + (now - anchor)`; pausing banks the
/// elapsed total and clears the anchor, so time spent paused is never
/// counted.
#[derive(Debug, Clone)]
pub struct SessionEngine {
    task: Task,
    break_duration: Duration,
    state: SessionState,
    /// State to return to on resume (only meaningful while Paused).
    paused_from: SessionState,
    /// The open work interval. None while breaking or after a terminal
    /// transition.
    current: Option<Interval>,
    /// Elapsed time accumulated before the last pause.
    banked: Duration,
    /// Instant the phase clock last started counting. None while paused
    /// or terminal.
    anchor: Option<DateTime<Utc>>,
}

impl SessionEngine {
    /// Construct a session already running, with the first interval open.
    ///
    /// # Errors
    /// Rejects a zero pomodoro target, zero durations, and a task whose
    /// recorded history already satisfies its target.
    pub fn new(task: Task, break_duration: Duration) -> Result<Self, ConfigError> {
        Self::new_at(task, break_duration, Utc::now())
    }

    /// See [`SessionEngine::new`]; `now` becomes the first interval's start.
    pub fn new_at(
        task: Task,
        break_duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, ConfigError> {
        if task.target_pomodoros == 0 {
            return Err(ConfigError::InvalidValue {
                key: "pomodoros".into(),
                message: "must be at least 1".into(),
            });
        }
        if task.duration.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "duration".into(),
                message: "must be positive".into(),
            });
        }
        if break_duration.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "break".into(),
                message: "must be positive".into(),
            });
        }
        if task.is_complete() {
            return Err(ConfigError::InvalidValue {
                key: "task".into(),
                message: format!("task {} is already complete", task.id),
            });
        }
        Ok(Self {
            task,
            break_duration,
            state: SessionState::Running,
            paused_from: SessionState::Running,
            current: Some(Interval::open(now)),
            banked: Duration::ZERO,
            anchor: Some(now),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    /// Consume the engine, returning the task with its recorded history.
    pub fn into_task(self) -> Task {
        self.task
    }

    /// Nominal duration of the current phase (work or break).
    pub fn phase_target(&self) -> Duration {
        let breaking = self.state == SessionState::Breaking
            || (self.state == SessionState::Paused && self.paused_from == SessionState::Breaking);
        if breaking {
            self.break_duration
        } else {
            self.task.duration
        }
    }

    fn elapsed_at(&self, now: DateTime<Utc>) -> Duration {
        let live = self
            .anchor
            .map(|anchor| (now - anchor).to_std().unwrap_or_default())
            .unwrap_or_default();
        self.banked + live
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_at(Utc::now())
    }

    pub fn snapshot_at(&self, now: DateTime<Utc>) -> Snapshot {
        let target = self.phase_target();
        let elapsed = if self.state.is_terminal() {
            Duration::ZERO
        } else {
            self.elapsed_at(now).min(target)
        };
        Snapshot {
            state: self.state,
            elapsed,
            target,
            completed: self.task.completed(),
            target_pomodoros: self.task.target_pomodoros,
            message: self.task.message.clone(),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance the clock. Returns an event when a phase boundary was
    /// crossed, `None` otherwise.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(Utc::now())
    }

    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            SessionState::Running => {
                let elapsed = self.elapsed_at(now);
                if elapsed < self.task.duration {
                    return None;
                }
                // Discard the tick overshoot: the interval closes at its
                // nominal boundary and the break clock starts there too.
                let boundary = nominal_boundary(now, elapsed, self.task.duration);
                let mut interval = self.current.take()?;
                interval.close(boundary);
                self.task.record_completed(interval);
                self.banked = Duration::ZERO;
                if self.task.is_complete() {
                    self.state = SessionState::Completed;
                    self.anchor = None;
                    Some(Event::SessionCompleted {
                        completed: self.task.completed(),
                        at: boundary,
                    })
                } else {
                    self.state = SessionState::Breaking;
                    self.anchor = Some(boundary);
                    Some(Event::PomodoroCompleted {
                        index: self.task.completed(),
                        at: boundary,
                    })
                }
            }
            SessionState::Breaking => {
                let elapsed = self.elapsed_at(now);
                if elapsed < self.break_duration {
                    return None;
                }
                let boundary = nominal_boundary(now, elapsed, self.break_duration);
                self.current = Some(Interval::open(boundary));
                self.state = SessionState::Running;
                self.banked = Duration::ZERO;
                self.anchor = Some(boundary);
                Some(Event::PomodoroStarted {
                    index: self.task.completed() + 1,
                    at: boundary,
                })
            }
            _ => None,
        }
    }

    /// Freeze elapsed accounting. No-op unless running or breaking; the
    /// open interval stays open.
    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(Utc::now())
    }

    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            SessionState::Running | SessionState::Breaking => {
                self.banked = self.elapsed_at(now);
                self.anchor = None;
                self.paused_from = self.state;
                self.state = SessionState::Paused;
                Some(Event::SessionPaused { at: now })
            }
            _ => None,
        }
    }

    /// Resume the phase clock with banked elapsed time intact. No-op
    /// unless paused.
    pub fn resume(&mut self) -> Option<Event> {
        self.resume_at(Utc::now())
    }

    pub fn resume_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != SessionState::Paused {
            return None;
        }
        self.state = self.paused_from;
        self.anchor = Some(now);
        Some(Event::SessionResumed { at: now })
    }

    /// Cancel the session, closing and recording any open interval so
    /// partial progress is never lost. No-op once terminal.
    pub fn stop(&mut self) -> Option<Event> {
        self.stop_at(Utc::now())
    }

    pub fn stop_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state.is_terminal() {
            return None;
        }
        if let Some(mut interval) = self.current.take() {
            interval.close(now);
            self.task.record_completed(interval);
        }
        self.state = SessionState::Cancelled;
        self.anchor = None;
        self.banked = Duration::ZERO;
        Some(Event::SessionCancelled {
            completed: self.task.completed(),
            at: now,
        })
    }
}

/// Instant the phase nominally ended: `now` minus whatever the tick
/// overshot the target by.
fn nominal_boundary(now: DateTime<Utc>, elapsed: Duration, target: Duration) -> DateTime<Utc> {
    let overshoot = elapsed.saturating_sub(target);
    now - chrono::Duration::from_std(overshoot).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn task(target: u32, duration_secs: u64) -> Task {
        Task::new(1, "write report", target, secs(duration_secs), vec![])
    }

    #[test]
    fn rejects_invalid_construction() {
        assert!(SessionEngine::new_at(task(0, 60), secs(30), t(0)).is_err());
        assert!(SessionEngine::new_at(task(2, 0), secs(30), t(0)).is_err());
        assert!(SessionEngine::new_at(task(2, 60), secs(0), t(0)).is_err());

        let mut done = task(1, 60);
        let mut interval = Interval::open(t(0));
        interval.close(t(60));
        done.record_completed(interval);
        assert!(SessionEngine::new_at(done, secs(30), t(0)).is_err());
    }

    #[test]
    fn starts_running_with_open_interval() {
        let engine = SessionEngine::new_at(task(2, 60), secs(30), t(0)).unwrap();
        assert_eq!(engine.state(), SessionState::Running);
        assert_eq!(engine.task().completed(), 0);
        let snap = engine.snapshot_at(t(10));
        assert_eq!(snap.elapsed, secs(10));
        assert_eq!(snap.target, secs(60));
    }

    #[test]
    fn two_pomodoro_session_runs_to_completion() {
        let mut engine = SessionEngine::new_at(task(2, 60), secs(30), t(0)).unwrap();

        assert!(engine.tick_at(t(59)).is_none());
        assert_eq!(engine.state(), SessionState::Running);

        // Overshoot past the boundary; the excess is discarded.
        match engine.tick_at(t(61)) {
            Some(Event::PomodoroCompleted { index, at }) => {
                assert_eq!(index, 1);
                assert_eq!(at, t(60));
            }
            other => panic!("expected PomodoroCompleted, got {other:?}"),
        }
        assert_eq!(engine.state(), SessionState::Breaking);
        assert_eq!(engine.task().intervals[0].end, Some(t(60)));

        assert!(engine.tick_at(t(89)).is_none());
        match engine.tick_at(t(92)) {
            Some(Event::PomodoroStarted { index, at }) => {
                assert_eq!(index, 2);
                assert_eq!(at, t(90));
            }
            other => panic!("expected PomodoroStarted, got {other:?}"),
        }
        assert_eq!(engine.state(), SessionState::Running);

        match engine.tick_at(t(151)) {
            Some(Event::SessionCompleted { completed, at }) => {
                assert_eq!(completed, 2);
                assert_eq!(at, t(150));
            }
            other => panic!("expected SessionCompleted, got {other:?}"),
        }
        assert_eq!(engine.state(), SessionState::Completed);

        // Exactly two closed intervals, each nominal-duration exact.
        let task = engine.into_task();
        assert_eq!(task.intervals.len(), 2);
        for interval in &task.intervals {
            assert!(interval.end.unwrap() > interval.start);
            assert_eq!(interval.duration(), Some(secs(60)));
        }
    }

    #[test]
    fn terminal_state_accepts_nothing() {
        let mut engine = SessionEngine::new_at(task(1, 60), secs(30), t(0)).unwrap();
        assert!(engine.tick_at(t(60)).is_some());
        assert_eq!(engine.state(), SessionState::Completed);

        assert!(engine.tick_at(t(120)).is_none());
        assert!(engine.pause_at(t(120)).is_none());
        assert!(engine.resume_at(t(120)).is_none());
        assert!(engine.stop_at(t(120)).is_none());
        assert_eq!(engine.state(), SessionState::Completed);
        assert_eq!(engine.task().intervals.len(), 1);
    }

    #[test]
    fn pause_freezes_elapsed_accounting() {
        let mut engine = SessionEngine::new_at(task(1, 60), secs(30), t(0)).unwrap();
        assert!(engine.pause_at(t(30)).is_some());
        assert_eq!(engine.state(), SessionState::Paused);

        // An arbitrary real-time delay while paused counts for nothing.
        assert_eq!(engine.snapshot_at(t(5000)).elapsed, secs(30));
        assert!(engine.resume_at(t(5000)).is_some());
        assert_eq!(engine.state(), SessionState::Running);

        assert!(engine.tick_at(t(5029)).is_none());
        let event = engine.tick_at(t(5030)).expect("boundary reached");
        match event {
            Event::SessionCompleted { completed, .. } => assert_eq!(completed, 1),
            other => panic!("expected SessionCompleted, got {other:?}"),
        }
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let mut engine = SessionEngine::new_at(task(1, 60), secs(30), t(0)).unwrap();
        assert!(engine.resume_at(t(5)).is_none());

        assert!(engine.pause_at(t(10)).is_some());
        assert!(engine.pause_at(t(20)).is_none());
        assert_eq!(engine.snapshot_at(t(20)).elapsed, secs(10));

        assert!(engine.resume_at(t(20)).is_some());
        assert!(engine.resume_at(t(25)).is_none());
        assert_eq!(engine.snapshot_at(t(30)).elapsed, secs(20));
    }

    #[test]
    fn zero_dwell_pause_resume_leaves_elapsed_unchanged() {
        let mut engine = SessionEngine::new_at(task(1, 60), secs(30), t(0)).unwrap();
        let before = engine.snapshot_at(t(30)).elapsed;
        engine.pause_at(t(30));
        engine.resume_at(t(30));
        assert_eq!(engine.snapshot_at(t(30)).elapsed, before);
    }

    #[test]
    fn pausing_a_break_works_like_pausing_work() {
        let mut engine = SessionEngine::new_at(task(2, 60), secs(30), t(0)).unwrap();
        engine.tick_at(t(60));
        assert_eq!(engine.state(), SessionState::Breaking);

        assert!(engine.pause_at(t(70)).is_some());
        assert_eq!(engine.snapshot_at(t(500)).target, secs(30));
        assert_eq!(engine.snapshot_at(t(500)).elapsed, secs(10));

        assert!(engine.resume_at(t(500)).is_some());
        assert_eq!(engine.state(), SessionState::Breaking);
        match engine.tick_at(t(520)) {
            Some(Event::PomodoroStarted { at, .. }) => assert_eq!(at, t(520)),
            other => panic!("expected PomodoroStarted, got {other:?}"),
        }
    }

    #[test]
    fn stop_closes_open_interval_and_keeps_history() {
        let mut prior = Interval::open(t(-100));
        prior.close(t(-40));
        let mut task = task(3, 60);
        task.record_completed(prior);

        let mut engine = SessionEngine::new_at(task, secs(30), t(0)).unwrap();
        match engine.stop_at(t(25)) {
            Some(Event::SessionCancelled { completed, at }) => {
                assert_eq!(completed, 2);
                assert_eq!(at, t(25));
            }
            other => panic!("expected SessionCancelled, got {other:?}"),
        }
        assert_eq!(engine.state(), SessionState::Cancelled);

        let task = engine.into_task();
        assert_eq!(task.intervals.len(), 2);
        assert_eq!(task.intervals[0].end, Some(t(-40)));
        assert_eq!(task.intervals[1].end, Some(t(25)));
    }

    #[test]
    fn stop_during_break_records_nothing_new() {
        let mut engine = SessionEngine::new_at(task(2, 60), secs(30), t(0)).unwrap();
        engine.tick_at(t(60));
        assert_eq!(engine.state(), SessionState::Breaking);

        engine.stop_at(t(75));
        assert_eq!(engine.state(), SessionState::Cancelled);
        assert_eq!(engine.task().intervals.len(), 1);
    }

    proptest! {
        #[test]
        fn pause_resume_never_changes_elapsed(
            offset_ms in 0u64..60_000,
            dwell_ms in 0u64..3_600_000,
        ) {
            let mut engine =
                SessionEngine::new_at(task(1, 60), secs(30), t(0)).unwrap();
            let pause_at = t(0) + chrono::Duration::milliseconds(offset_ms as i64);
            let before = engine.snapshot_at(pause_at).elapsed;

            engine.pause_at(pause_at);
            let resume_at = pause_at + chrono::Duration::milliseconds(dwell_ms as i64);
            engine.resume_at(resume_at);

            prop_assert_eq!(engine.snapshot_at(resume_at).elapsed, before);
        }
    }
}
