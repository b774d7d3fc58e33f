//! TOML-based application configuration.
//!
//! Stores user preferences: timer durations, notification settings and
//! the renderer color names. Stored at `<data_dir>/config.toml`; every
//! field has a serde default so partial files load cleanly, and a
//! missing file is written back with defaults on first load.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::data_dir;

/// Timer durations and the default pomodoro count for new tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_pomodoro_min")]
    pub pomodoro_min: u64,
    #[serde(default = "default_break_min")]
    pub break_min: u64,
    #[serde(default = "default_pomodoros")]
    pub pomodoros: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Path to a custom icon. If unset, the bundled icon is seeded to
    /// the data directory on first use.
    #[serde(default)]
    pub icon: Option<String>,
}

/// Color names consumed by the status renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorsConfig {
    #[serde(default = "default_running_color")]
    pub running: String,
    #[serde(default = "default_breaking_color")]
    pub breaking: String,
    #[serde(default = "default_paused_color")]
    pub paused: String,
    #[serde(default = "default_complete_color")]
    pub complete: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub colors: ColorsConfig,
}

fn default_pomodoro_min() -> u64 {
    25
}
fn default_break_min() -> u64 {
    5
}
fn default_pomodoros() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_running_color() -> String {
    "red".into()
}
fn default_breaking_color() -> String {
    "green".into()
}
fn default_paused_color() -> String {
    "white".into()
}
fn default_complete_color() -> String {
    "blue".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            pomodoro_min: default_pomodoro_min(),
            break_min: default_break_min(),
            pomodoros: default_pomodoros(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            icon: None,
        }
    }
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            running: default_running_color(),
            breaking: default_breaking_color(),
            paused: default_paused_color(),
            complete: default_complete_color(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            notifications: NotificationsConfig::default(),
            colors: ColorsConfig::default(),
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf, std::io::Error> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk; a missing file is replaced with written-back
    /// defaults.
    ///
    /// # Errors
    /// Fails if an existing file cannot be parsed, or the defaults
    /// cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    pub fn pomodoro_duration(&self) -> Duration {
        Duration::from_secs(self.timer.pomodoro_min * 60)
    }

    pub fn break_duration(&self) -> Duration {
        Duration::from_secs(self.timer.break_min * 60)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        match current {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, preserving the field's
    /// type, and persist the result.
    ///
    /// # Errors
    /// Fails on unknown keys, unparseable values, or a failed save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        let mut parts = key.split('.').peekable();
        let mut current = &mut json;
        while let Some(part) = parts.next() {
            let obj = current
                .as_object_mut()
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            let slot = obj
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            if parts.peek().is_none() {
                let parsed = parse_as(slot, key, value)?;
                *slot = parsed;
                break;
            }
            current = slot;
        }

        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.save()
    }
}

/// Parse `value` with the type of the field it replaces.
fn parse_as(
    existing: &serde_json::Value,
    key: &str,
    value: &str,
) -> Result<serde_json::Value, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };
    match existing {
        serde_json::Value::Bool(_) => value
            .parse::<bool>()
            .map(serde_json::Value::Bool)
            .map_err(|e| invalid(e.to_string())),
        serde_json::Value::Number(_) => value
            .parse::<u64>()
            .map(|n| serde_json::Value::Number(n.into()))
            .map_err(|e| invalid(e.to_string())),
        serde_json::Value::String(_) | serde_json::Value::Null => {
            Ok(serde_json::Value::String(value.to_string()))
        }
        _ => Err(ConfigError::UnknownKey(key.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.pomodoro_min, 25);
        assert_eq!(parsed.timer.break_min, 5);
        assert!(parsed.notifications.enabled);
        assert_eq!(parsed.colors.running, "red");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let parsed: Config = toml::from_str("[timer]\npomodoro_min = 50\n").unwrap();
        assert_eq!(parsed.timer.pomodoro_min, 50);
        assert_eq!(parsed.timer.break_min, 5);
        assert_eq!(parsed.colors.complete, "blue");
    }

    #[test]
    fn get_by_dot_path() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.pomodoro_min").as_deref(), Some("25"));
        assert_eq!(cfg.get("colors.running").as_deref(), Some("red"));
        assert_eq!(cfg.get("notifications.enabled").as_deref(), Some("true"));
        assert!(cfg.get("no.such.key").is_none());
    }

    #[test]
    fn durations_derive_from_minutes() {
        let cfg = Config::default();
        assert_eq!(cfg.pomodoro_duration(), Duration::from_secs(25 * 60));
        assert_eq!(cfg.break_duration(), Duration::from_secs(5 * 60));
    }
}
