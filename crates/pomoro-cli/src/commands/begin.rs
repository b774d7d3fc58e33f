//! The interactive session loop.
//!
//! `begin` wires a stored task, the configuration, and a notifier into
//! a session, then runs three independent pieces: the core `drive` loop
//! (ticks + commands), a renderer repainting one status line from the
//! latest snapshot, and a stdin reader feeding pause/resume/stop into
//! the command channel. Ctrl-C maps to stop, so an interrupted session
//! still records its partial progress.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use clap::Args;
use pomoro_core::display::{StatusLine, Theme, REFRESH_INTERVAL};
use pomoro_core::notify;
use pomoro_core::storage::{Config, TaskStore};
use pomoro_core::task::Task;
use pomoro_core::timer::{drive, Command, SessionEngine, Snapshot, TICK_INTERVAL};
use tokio::sync::{mpsc, watch};

#[derive(Args)]
pub struct BeginArgs {
    /// Task id (see `pomoro task list`)
    pub id: i64,
}

#[derive(Args)]
pub struct StartArgs {
    /// What the task is about
    pub message: String,
    /// Number of pomodoros to run
    #[arg(short, long)]
    pub pomodoros: Option<u32>,
    /// Length of each pomodoro in minutes
    #[arg(short, long)]
    pub duration: Option<u64>,
    /// Free-form tags (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
}

pub fn run(args: BeginArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = TaskStore::open()?;
    let task = store.get_task(args.id)?;
    run_session(&store, task)
}

pub fn start(args: StartArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = TaskStore::open()?;
    let config = Config::load()?;
    let pomodoros = args.pomodoros.unwrap_or(config.timer.pomodoros);
    let duration = args
        .duration
        .map(|min| Duration::from_secs(min * 60))
        .unwrap_or_else(|| config.pomodoro_duration());
    let task = store.create_task(&args.message, &args.tags, pomodoros, duration)?;
    run_session(&store, task)
}

fn run_session(store: &TaskStore, task: Task) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let theme = Theme::from_config(&config.colors)?;
    let notifier = notify::from_config(&config)?;
    let engine = SessionEngine::new(task, config.break_duration())?;

    println!("{}", engine.task().message);
    println!("[p]ause [r]esume [s]top");

    let rt = tokio::runtime::Runtime::new()?;
    let task = rt.block_on(async {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (snap_tx, snap_rx) = watch::channel(engine.snapshot());

        spawn_input_reader(cmd_tx.clone());
        let interrupt = cmd_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = interrupt.send(Command::Stop).await;
            }
        });
        let renderer = tokio::spawn(render_loop(snap_rx, theme));

        let task = drive(engine, notifier, TICK_INTERVAL, cmd_rx, snap_tx).await;
        let _ = renderer.await;
        task
    });
    // Bounded wait for any in-flight notification delivery.
    rt.shutdown_timeout(Duration::from_secs(1));

    println!();
    store.persist(&task)?;
    let outcome = if task.is_complete() { "complete" } else { "stopped" };
    println!(
        "{outcome} -- recorded {}/{} pomodoros for task {}",
        task.completed(),
        task.target_pomodoros,
        task.id,
    );
    Ok(())
}

/// Repaints the status line from the latest published snapshot until
/// the session reaches a terminal state. Read-only: a slow terminal
/// never holds up the session clock.
async fn render_loop(snapshots: watch::Receiver<Snapshot>, theme: Theme) {
    let mut line = StatusLine::new(theme);
    let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
    loop {
        ticker.tick().await;
        let snapshot = snapshots.borrow().clone();
        print!("\r\x1b[K{}", line.render(&snapshot));
        let _ = io::stdout().flush();
        if snapshot.state.is_terminal() {
            break;
        }
    }
}

/// Reads pause/resume/stop keys from stdin on a dedicated thread.
fn spawn_input_reader(commands: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let command = match line.trim() {
                "p" | "pause" => Command::Pause,
                "r" | "resume" => Command::Resume,
                "s" | "q" | "stop" => Command::Stop,
                _ => continue,
            };
            let stop = command == Command::Stop;
            if commands.blocking_send(command).is_err() || stop {
                break;
            }
        }
    });
}
