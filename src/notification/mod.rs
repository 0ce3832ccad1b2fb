//! Desktop notification dispatch for phase transitions.
//!
//! Built on `notify-rust`. Delivery is strictly best-effort:
//!
//! - Denied permission is a steady state — no retries until the user
//!   re-enables the setting, which resets the state to undetermined
//! - Missing platform capability degrades to a no-op
//! - No failure here ever reaches the timer engine
//!
//! The engine depends on the [`Notifier`] trait, so headless tests use a
//! recording fake instead of the desktop implementation.

pub mod error;

use std::sync::Mutex;

use notify_rust::Notification;
use tracing::{debug, warn};

pub use error::NotificationError;

/// Application name shown by the platform notification UI.
const APP_NAME: &str = "focustick";

/// Permission state for desktop notifications.
///
/// The first delivery attempt doubles as the permission request:
/// success resolves to `Granted`, failure to `Denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// No delivery attempted since the last (re-)enable.
    #[default]
    Undetermined,
    /// A delivery succeeded; show immediately from now on.
    Granted,
    /// Delivery failed; do nothing until the setting is toggled back on.
    Denied,
}

/// Trait for notification dispatch implementations.
///
/// `notify` must never raise: permission and display failures are
/// swallowed inside the implementation.
pub trait Notifier: Send + Sync {
    /// Shows a short text alert, best-effort.
    fn notify(&self, title: &str, body: &str);

    /// Returns the current permission state.
    fn permission(&self) -> PermissionState;

    /// Forgets a previous denial. Called when the user re-enables the
    /// notification setting.
    fn reset_permission(&self);
}

// ============================================================================
// DesktopNotifier
// ============================================================================

/// Notifier backed by the platform notification service.
#[derive(Debug, Default)]
pub struct DesktopNotifier {
    permission: Mutex<PermissionState>,
}

impl DesktopNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            permission: Mutex::new(PermissionState::Undetermined),
        }
    }

    fn try_send(title: &str, body: &str) -> Result<(), NotificationError> {
        Notification::new()
            .appname(APP_NAME)
            .summary(title)
            .body(body)
            .show()
            .map(|_| ())
            .map_err(|e| NotificationError::DeliveryFailed(e.to_string()))
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        // A poisoned lock must not break delivery: recover the state
        // instead of panicking inside the effect dispatcher.
        let mut permission = self
            .permission
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        match *permission {
            PermissionState::Denied => {
                debug!("Notifications denied, skipping \"{}\"", title);
            }
            PermissionState::Granted | PermissionState::Undetermined => {
                match Self::try_send(title, body) {
                    Ok(()) => {
                        *permission = PermissionState::Granted;
                        debug!("Notification shown: {}", title);
                    }
                    Err(e) => {
                        // Treat failure as a denial: steady-state off
                        // until the user re-enables the setting.
                        *permission = PermissionState::Denied;
                        warn!("Notification delivery failed, disabling until re-enabled: {}", e);
                    }
                }
            }
        }
    }

    fn permission(&self) -> PermissionState {
        *self.permission.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn reset_permission(&self) {
        *self.permission.lock().unwrap_or_else(|e| e.into_inner()) =
            PermissionState::Undetermined;
        debug!("Notification permission state reset");
    }
}

// ============================================================================
// MockNotifier
// ============================================================================

/// Recording notifier for testing.
#[derive(Debug, Default)]
pub struct MockNotifier {
    notifications: Mutex<Vec<(String, String)>>,
    permission: Mutex<PermissionState>,
    should_fail: std::sync::atomic::AtomicBool,
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
            permission: Mutex::new(PermissionState::Undetermined),
            should_fail: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// When set, every delivery attempt fails (and flips the state to
    /// `Denied`, like the real platform path).
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::SeqCst);
    }

    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }

    #[must_use]
    pub fn get_notifications(&self) -> Vec<(String, String)> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.notifications.lock().unwrap().clear();
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, title: &str, body: &str) {
        let mut permission = self.permission.lock().unwrap();
        if *permission == PermissionState::Denied {
            return;
        }
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            *permission = PermissionState::Denied;
            return;
        }
        *permission = PermissionState::Granted;
        self.notifications
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }

    fn permission(&self) -> PermissionState {
        *self.permission.lock().unwrap()
    }

    fn reset_permission(&self) {
        *self.permission.lock().unwrap() = PermissionState::Undetermined;
    }
}
