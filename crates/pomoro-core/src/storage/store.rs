//! SQLite-backed task persistence.
//!
//! Supplies tasks (with any previously recorded intervals) before a
//! session starts and receives them back, mutated, after the session
//! ends or is cancelled. Timestamps are stored as RFC 3339 text.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::error::StoreError;
use crate::task::{Interval, Task};

use super::data_dir;

/// SQLite database for tasks and their recorded intervals.
pub struct TaskStore {
    conn: Connection,
}

impl TaskStore {
    /// Open the database at `<data_dir>/pomoro.db`, creating the file
    /// and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()?.join("pomoro.db");
        let conn =
            Connection::open(&path).map_err(|source| StoreError::OpenFailed { path, source })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::OpenFailed {
            path: std::path::PathBuf::from(":memory:"),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                message     TEXT NOT NULL,
                tags        TEXT NOT NULL DEFAULT '[]',
                pomodoros   INTEGER NOT NULL,
                duration_ms INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS intervals (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id    INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                started_at TEXT NOT NULL,
                ended_at   TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_intervals_task_id ON intervals(task_id);",
        )?;
        Ok(())
    }

    /// Insert a new task and return it with its assigned id.
    pub fn create_task(
        &self,
        message: &str,
        tags: &[String],
        pomodoros: u32,
        duration: Duration,
    ) -> Result<Task, StoreError> {
        let tags_json = serde_json::to_string(tags)
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        self.conn.execute(
            "INSERT INTO tasks (message, tags, pomodoros, duration_ms)
             VALUES (?1, ?2, ?3, ?4)",
            params![message, tags_json, pomodoros, duration.as_millis() as i64],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(Task::new(id, message, pomodoros, duration, tags.to_vec()))
    }

    /// Load a task with its recorded intervals.
    pub fn get_task(&self, id: i64) -> Result<Task, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, message, tags, pomodoros, duration_ms FROM tasks WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, u32>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(id),
                other => StoreError::from(other),
            })?;
        self.task_from_row(row)
    }

    /// All tasks, oldest first, intervals included.
    pub fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, message, tags, pomodoros, duration_ms FROM tasks ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(|row| self.task_from_row(row)).collect()
    }

    /// Delete a task and its intervals.
    pub fn delete_task(&self, id: i64) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM intervals WHERE task_id = ?1", params![id])?;
        let affected = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    /// Rewrite a task's recorded intervals after a session.
    pub fn persist(&self, task: &Task) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM intervals WHERE task_id = ?1", params![task.id])?;
        for interval in &task.intervals {
            self.conn.execute(
                "INSERT INTO intervals (task_id, started_at, ended_at) VALUES (?1, ?2, ?3)",
                params![
                    task.id,
                    interval.start.to_rfc3339(),
                    interval.end.map(|end| end.to_rfc3339()),
                ],
            )?;
        }
        Ok(())
    }

    fn task_from_row(
        &self,
        (id, message, tags_json, pomodoros, duration_ms): (i64, String, String, u32, i64),
    ) -> Result<Task, StoreError> {
        let tags: Vec<String> = serde_json::from_str(&tags_json)
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        let mut task = Task::new(
            id,
            message,
            pomodoros,
            Duration::from_millis(duration_ms.max(0) as u64),
            tags,
        );
        task.intervals = self.intervals_for(id)?;
        Ok(task)
    }

    fn intervals_for(&self, task_id: i64) -> Result<Vec<Interval>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT started_at, ended_at FROM intervals WHERE task_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![task_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(start, end)| {
                Ok(Interval {
                    start: parse_ts(&start)?,
                    end: end.as_deref().map(parse_ts).transpose()?,
                })
            })
            .collect()
    }
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::QueryFailed(format!("bad timestamp '{s}': {e}")))
}
