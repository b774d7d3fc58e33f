//! Task and interval records.
//!
//! A [`Task`] is a unit of work scheduled to run for a fixed number of
//! pomodoros; an [`Interval`] is one recorded work period. Intervals are
//! created and closed by the session engine only; the completed count is
//! always recomputed from the recorded intervals, never stored.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timed work period. `end` is `None` while the interval is open.
///
/// Immutable once closed: `close` on a closed interval changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl Interval {
    /// Open a new interval starting at `start`.
    pub fn open(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// Close the interval at `end`. Returns `false` (and leaves the
    /// record untouched) if it was already closed.
    pub fn close(&mut self, end: DateTime<Utc>) -> bool {
        if self.end.is_some() {
            return false;
        }
        self.end = Some(end);
        true
    }

    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    /// Runtime of the interval, defined only once closed.
    pub fn duration(&self) -> Option<Duration> {
        self.end
            .map(|end| (end - self.start).to_std().unwrap_or_default())
    }
}

/// A unit of work scheduled to run for `target_pomodoros` intervals of
/// `duration` each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub message: String,
    /// Number of pomodoros required to complete the task.
    pub target_pomodoros: u32,
    /// Nominal length of each pomodoro.
    pub duration: Duration,
    /// Free-form tags associated with this task.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Recorded intervals, oldest first. Grows only through the session
    /// engine; everything else reads.
    #[serde(default)]
    pub intervals: Vec<Interval>,
}

impl Task {
    pub fn new(
        id: i64,
        message: impl Into<String>,
        target_pomodoros: u32,
        duration: Duration,
        tags: Vec<String>,
    ) -> Self {
        Self {
            id,
            message: message.into(),
            target_pomodoros,
            duration,
            tags,
            intervals: Vec::new(),
        }
    }

    /// Append a completed interval to the task's history.
    pub fn record_completed(&mut self, interval: Interval) {
        self.intervals.push(interval);
    }

    /// Count of closed intervals. Recomputed on every call.
    pub fn completed(&self) -> usize {
        self.intervals.iter().filter(|i| i.is_closed()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.completed() >= self.target_pomodoros as usize
    }
}
