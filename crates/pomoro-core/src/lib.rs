//! # Pomoro Core Library
//!
//! Core business logic for the Pomoro pomodoro timer. The CLI binary is
//! a thin layer over this crate: it wires stored tasks and configuration
//! into a session and draws what the session publishes.
//!
//! ## Architecture
//!
//! - **Session engine**: a wall-clock-based state machine that requires
//!   the caller to periodically invoke `tick()`; pause/resume/stop are
//!   explicit commands
//! - **Runner**: the async loop that serializes ticks with commands,
//!   publishes snapshots to the renderer, and fires notifications
//!   without blocking the clock
//! - **Storage**: SQLite task store and TOML-based configuration
//! - **Notify**: pluggable notification capability (no-op or desktop)
//! - **Display**: spinner and status-line rendering from snapshots
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: core session state machine
//! - [`drive`]: per-session async loop
//! - [`TaskStore`]: task and interval persistence
//! - [`Notifier`]: trait for notification backends

pub mod display;
pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod task;
pub mod timer;

pub use display::{StatusLine, Theme, Wheel, REFRESH_INTERVAL};
pub use error::{ConfigError, CoreError, NotifyError, StoreError};
pub use events::Event;
pub use notify::{DesktopNotifier, NoopNotifier, Notifier};
pub use storage::{Config, TaskStore};
pub use task::{Interval, Task};
pub use timer::{drive, Command, SessionEngine, SessionState, Snapshot, TICK_INTERVAL};
