//! Focus Timer Library
//!
//! This library provides the core functionality for the focustick CLI.
//! It includes:
//! - Timer engine alternating focus sessions and breaks
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing and display utilities
//! - Type definitions for configuration and state
//! - Transition tone synthesis via rodio
//! - Desktop notifications with a one-shot permission model
//! - Preference persistence with per-key fallback to defaults

pub mod cli;
pub mod daemon;
pub mod notification;
pub mod prefs;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    IpcRequest, IpcResponse, Phase, ResponseData, SoundPreset, Theme, TimerConfig, TimerState,
    TimerStyle, Transition,
};

// Re-export notification types
pub use notification::{
    DesktopNotifier, MockNotifier, NotificationError, Notifier, PermissionState,
};

// Re-export sound types
pub use sound::{
    schedule_for, try_create_synth, MockToneSynth, RodioToneSynth, SoundError, Tone, ToneSchedule,
    ToneSynthesizer, Waveform,
};

// Re-export preference types
pub use prefs::{default_prefs_path, PreferenceStore, Preferences};
