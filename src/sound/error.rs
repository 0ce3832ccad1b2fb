//! Sound system error types.
//!
//! Failures here are never fatal: the engine treats every sound error as
//! "no cue this time" and keeps counting down.

use thiserror::Error;

/// Errors that can occur while synthesizing a transition tone.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., headless host).
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Failed to create the audio output sink.
    #[error("failed to create audio sink: {0}")]
    StreamError(String),

    /// Generic playback error.
    #[error("tone playback failed: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }
}
