use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every session transition produces an Event.
/// The runner maps a subset of these to desktop notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A work interval reached its nominal duration and was recorded.
    PomodoroCompleted {
        /// 1-based count of recorded pomodoros after this one.
        index: usize,
        at: DateTime<Utc>,
    },
    /// A break ended and the next work interval opened.
    PomodoroStarted {
        index: usize,
        at: DateTime<Utc>,
    },
    SessionPaused {
        at: DateTime<Utc>,
    },
    SessionResumed {
        at: DateTime<Utc>,
    },
    /// The final required pomodoro was recorded.
    SessionCompleted {
        completed: usize,
        at: DateTime<Utc>,
    },
    /// The user stopped the session before completion.
    SessionCancelled {
        completed: usize,
        at: DateTime<Utc>,
    },
}
