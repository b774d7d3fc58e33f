//! Desktop notification capability.
//!
//! The session runner depends only on the [`Notifier`] trait; the
//! concrete variant is chosen once at construction time. Delivery
//! failures are never fatal -- callers log and carry on.

use std::path::PathBuf;
use std::sync::Arc;

use notify_rust::Notification;

use crate::error::{CoreError, NotifyError};
use crate::storage::{self, Config};

/// Embedded default icon, seeded to disk the first time a desktop
/// backend needs it.
static DEFAULT_ICON: &[u8] = include_bytes!("../../assets/icon.png");

/// Capability for emitting a user-visible alert at phase transitions.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Does nothing, always succeeds. Used when notifications are disabled.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _title: &str, _body: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Delivers through the platform notification service.
pub struct DesktopNotifier {
    icon_path: PathBuf,
}

impl DesktopNotifier {
    /// Writes the bundled icon to `icon_path` if nothing exists there
    /// yet; an existing file is left untouched.
    pub fn new(icon_path: PathBuf) -> Result<Self, NotifyError> {
        if !icon_path.exists() {
            std::fs::write(&icon_path, DEFAULT_ICON).map_err(|source| NotifyError::Icon {
                path: icon_path.clone(),
                source,
            })?;
        }
        Ok(Self { icon_path })
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        Notification::new()
            .summary(title)
            .body(body)
            .icon(&self.icon_path.to_string_lossy())
            .show()?;
        Ok(())
    }
}

/// Select a notifier variant from configuration.
pub fn from_config(config: &Config) -> Result<Arc<dyn Notifier>, CoreError> {
    if !config.notifications.enabled {
        return Ok(Arc::new(NoopNotifier));
    }
    let icon_path = match &config.notifications.icon {
        Some(path) => PathBuf::from(path),
        None => storage::data_dir()?.join("icon.png"),
    };
    Ok(Arc::new(DesktopNotifier::new(icon_path)?))
}
