mod config;
mod store;

pub use config::{ColorsConfig, Config, NotificationsConfig, TimerConfig};
pub use store::TaskStore;

use std::path::PathBuf;

/// Returns `~/.config/pomoro/`, creating it if needed.
///
/// Set POMORO_DIR to use a different directory (tests and dev
/// environments rely on this).
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("POMORO_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("pomoro"),
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
