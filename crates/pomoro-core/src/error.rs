//! Core error types for pomoro-core.
//!
//! Three failure domains: configuration (fatal before a session starts),
//! storage (fatal to the invoking command), and notification delivery
//! (logged and swallowed, never fatal to a running session).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomoro-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage-related errors
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Notification-related errors
    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
///
/// Invalid session parameters are rejected here, before any timer starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration or session parameter
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Color name not recognized by the renderer
    #[error("bad color choice: {0}")]
    BadColor(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the database
    #[error("failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// No task with the given id
    #[error("no task with id {0}")]
    NotFound(i64),

    /// Data directory could not be resolved or created
    #[error("cannot resolve data directory: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Notification delivery errors. Always recoverable: the session runner
/// logs these and keeps ticking.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The backend rejected or failed to deliver the notification
    #[error("delivery failed: {0}")]
    Delivery(#[from] notify_rust::error::Error),

    /// Seeding the icon asset failed
    #[error("failed to write icon to {path}: {source}")]
    Icon {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::QueryFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
