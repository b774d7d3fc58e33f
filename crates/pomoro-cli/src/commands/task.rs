use std::time::Duration;

use clap::Subcommand;
use pomoro_core::storage::{Config, TaskStore};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// What the task is about
        message: String,
        /// Number of pomodoros to run
        #[arg(short, long)]
        pomodoros: Option<u32>,
        /// Length of each pomodoro in minutes
        #[arg(short, long)]
        duration: Option<u64>,
        /// Free-form tags (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// List tasks with their recorded progress
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a task and its recorded intervals
    Delete { id: i64 },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = TaskStore::open()?;
    match action {
        TaskAction::Create {
            message,
            pomodoros,
            duration,
            tags,
        } => {
            let config = Config::load()?;
            let pomodoros = pomodoros.unwrap_or(config.timer.pomodoros);
            let duration = duration
                .map(|min| Duration::from_secs(min * 60))
                .unwrap_or_else(|| config.pomodoro_duration());
            let task = store.create_task(&message, &tags, pomodoros, duration)?;
            println!("created task {}", task.id);
        }
        TaskAction::List { json } => {
            let tasks = store.list_tasks()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                for task in tasks {
                    let tags = if task.tags.is_empty() {
                        String::new()
                    } else {
                        format!(" +{}", task.tags.join(" +"))
                    };
                    println!(
                        "{:4} [{}/{}] {}{}",
                        task.id,
                        task.completed(),
                        task.target_pomodoros,
                        task.message,
                        tags,
                    );
                }
            }
        }
        TaskAction::Delete { id } => {
            store.delete_task(id)?;
            println!("deleted task {id}");
        }
    }
    Ok(())
}
