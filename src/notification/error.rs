//! Notification error types.
//!
//! These errors never propagate past the notifier: delivery is
//! best-effort and the engine must keep counting down regardless.

use thiserror::Error;

/// Errors that can occur while delivering a desktop notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The notification was rejected by the platform, or no
    /// notification service was reachable.
    #[error("notification delivery failed: {0}")]
    DeliveryFailed(String),
}
