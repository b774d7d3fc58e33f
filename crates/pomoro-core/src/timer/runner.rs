//! Async session loop.
//!
//! [`drive`] owns a [`SessionEngine`] for the life of one session. Ticks
//! and user commands are arms of a single `select!`, so a command can
//! never interleave with a tick mid-transition. After every step the
//! runner publishes a fresh snapshot through a `watch` channel -- the
//! renderer always reads a whole snapshot, never a half-updated one --
//! and dispatches notifications off the tick path on the blocking pool,
//! logging failures instead of propagating them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::events::Event;
use crate::notify::Notifier;
use crate::task::Task;
use crate::timer::engine::{SessionEngine, Snapshot};

/// Resolution of the session clock.
pub const TICK_INTERVAL: Duration = Duration::from_millis(800);

/// User commands delivered from outside the timer loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    Stop,
}

/// Drive a session to a terminal state and return the task with its
/// recorded history.
///
/// Closing the command channel cancels the session, so a vanished input
/// source can never leave the loop running unattended.
pub async fn drive(
    mut engine: SessionEngine,
    notifier: Arc<dyn Notifier>,
    tick_every: Duration,
    mut commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<Snapshot>,
) -> Task {
    let mut ticker = tokio::time::interval(tick_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let event = tokio::select! {
            _ = ticker.tick() => engine.tick(),
            cmd = commands.recv() => match cmd {
                Some(Command::Pause) => engine.pause(),
                Some(Command::Resume) => engine.resume(),
                Some(Command::Stop) | None => engine.stop(),
            },
        };
        if let Some(event) = &event {
            dispatch(&notifier, event, &engine.task().message);
        }
        snapshots.send_replace(engine.snapshot());
        if engine.state().is_terminal() {
            break;
        }
    }
    engine.into_task()
}

/// Fire-and-forget notification delivery. Never awaited by the tick
/// loop; a slow or dead backend degrades observation only.
fn dispatch(notifier: &Arc<dyn Notifier>, event: &Event, message: &str) {
    let (title, body) = match event {
        Event::PomodoroCompleted { .. } => ("Pomodoro complete", message),
        Event::SessionCompleted { .. } => ("Task complete", message),
        _ => return,
    };
    let notifier = Arc::clone(notifier);
    let title = title.to_string();
    let body = body.to_string();
    tokio::task::spawn_blocking(move || {
        if let Err(e) = notifier.notify(&title, &body) {
            log::warn!("notification failed: {e}");
        }
    });
}
