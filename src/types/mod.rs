//! Core data types for the focus timer.
//!
//! This module defines the data structures used for:
//! - The focus/break phase state machine and its countdown
//! - Duration configuration with validation
//! - Preference value vocabulary (theme, style, sound preset)
//! - IPC request/response serialization

use serde::{Deserialize, Serialize};

// ============================================================================
// Phase
// ============================================================================

/// Which of the two countdown modes is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Counting down a focus session
    Focus,
    /// Counting down a break
    Break,
}

impl Phase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Focus => "focus",
            Phase::Break => "break",
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Focus
    }
}

// ============================================================================
// Preference vocabulary
// ============================================================================

/// Color theme, persisted for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// Visual timer style. The engine only stores it for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStyle {
    Circle,
    Pill,
    Minimal,
}

impl TimerStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStyle::Circle => "circle",
            TimerStyle::Pill => "pill",
            TimerStyle::Minimal => "minimal",
        }
    }
}

impl Default for TimerStyle {
    fn default() -> Self {
        TimerStyle::Circle
    }
}

/// Waveform preset for the transition tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundPreset {
    /// Two soft sine tones with a short gap
    Chime,
    /// Two descending sine tones
    Bell,
    /// Three short square-wave beeps
    Digital,
}

impl SoundPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundPreset::Chime => "chime",
            SoundPreset::Bell => "bell",
            SoundPreset::Digital => "digital",
        }
    }
}

impl Default for SoundPreset {
    fn default() -> Self {
        SoundPreset::Chime
    }
}

// ============================================================================
// TimerConfig
// ============================================================================

/// Durations the countdown is seeded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Focus duration in minutes (> 0)
    pub focus_minutes: u32,
    /// Break duration in minutes. Zero skips the break phase entirely;
    /// the setters reject zero but a directly constructed zero is honored.
    pub break_minutes: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            break_minutes: 5,
        }
    }
}

impl TimerConfig {
    /// Creates a configuration with the given durations.
    pub fn new(focus_minutes: u32, break_minutes: u32) -> Self {
        Self {
            focus_minutes,
            break_minutes,
        }
    }
}

// ============================================================================
// Transition
// ============================================================================

/// The atomic event of a phase's remaining time reaching zero.
///
/// Returned by [`TimerState::tick`] so the caller can fire side effects
/// (tone, notification) after the state change has committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A focus session finished. The session counter has already been
    /// incremented. `break_skipped` is true when the configured break
    /// length is zero and the timer rolled straight into the next focus.
    FocusFinished { break_skipped: bool },
    /// A break finished; the timer rolled into the next focus session.
    BreakFinished,
}

// ============================================================================
// TimerState
// ============================================================================

/// The live countdown state.
///
/// There is exactly one mutator of this state (the engine task); every
/// command below is a pure in-memory transition, so the whole machine is
/// testable without a runtime or a clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Current phase
    pub phase: Phase,
    /// Remaining seconds in the current phase
    pub remaining_seconds: u32,
    /// Whether the countdown is active
    pub running: bool,
    /// Completed focus sessions (breaks never increment this)
    pub sessions_completed: u32,
    /// Configured durations
    pub config: TimerConfig,
}

impl TimerState {
    /// Creates a fresh state: idle focus, seeded from the configured
    /// focus duration.
    pub fn new(config: TimerConfig) -> Self {
        Self {
            phase: Phase::Focus,
            remaining_seconds: config.focus_minutes.saturating_mul(60),
            running: false,
            sessions_completed: 0,
            config,
        }
    }

    /// Starts (or resumes) the countdown.
    ///
    /// Returns false if the timer was already running (no-op).
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Pauses the countdown, leaving `remaining_seconds` untouched.
    ///
    /// Returns false if the timer was already paused (no-op).
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Flips between running and paused.
    pub fn toggle(&mut self) {
        if self.running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Resets to a fresh idle focus state. Always valid; the session
    /// counter is preserved.
    pub fn reset(&mut self) {
        self.running = false;
        self.phase = Phase::Focus;
        self.remaining_seconds = self.config.focus_minutes.saturating_mul(60);
    }

    /// Advances the countdown by one second.
    ///
    /// Returns the transition when this tick was the last second of the
    /// phase. The transition and the next phase's auto-start happen
    /// atomically here: the timer never rests at 00:00, it rolls into
    /// the next phase still running.
    pub fn tick(&mut self) -> Option<Transition> {
        if !self.running {
            return None;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return None;
        }

        match self.phase {
            Phase::Focus => {
                self.sessions_completed += 1;
                if self.config.break_minutes > 0 {
                    self.phase = Phase::Break;
                    self.remaining_seconds = self.config.break_minutes.saturating_mul(60);
                    Some(Transition::FocusFinished {
                        break_skipped: false,
                    })
                } else {
                    // Zero-length break: roll straight into the next focus.
                    self.remaining_seconds = self.config.focus_minutes.saturating_mul(60);
                    Some(Transition::FocusFinished { break_skipped: true })
                }
            }
            Phase::Break => {
                self.phase = Phase::Focus;
                self.remaining_seconds = self.config.focus_minutes.saturating_mul(60);
                Some(Transition::BreakFinished)
            }
        }
    }

    /// Changes the focus duration.
    ///
    /// Rejected (state unchanged) while running or for a non-positive
    /// value; changing the current phase's duration also reseeds the
    /// countdown immediately.
    pub fn set_focus_minutes(&mut self, minutes: u32) -> bool {
        if self.running || minutes == 0 {
            return false;
        }
        self.config.focus_minutes = minutes;
        if self.phase == Phase::Focus {
            // Saturate so an absurdly large duration clamps instead of
            // overflowing.
            self.remaining_seconds = minutes.saturating_mul(60);
        }
        true
    }

    /// Changes the break duration. Same guards as [`Self::set_focus_minutes`].
    pub fn set_break_minutes(&mut self, minutes: u32) -> bool {
        if self.running || minutes == 0 {
            return false;
        }
        self.config.break_minutes = minutes;
        if self.phase == Phase::Break {
            self.remaining_seconds = minutes.saturating_mul(60);
        }
        true
    }

    /// Whole minutes remaining, for display.
    pub fn remaining_minutes(&self) -> u32 {
        self.remaining_seconds / 60
    }

    /// Seconds within the current minute, for display.
    pub fn remaining_secs_in_minute(&self) -> u32 {
        self.remaining_seconds % 60
    }

    /// Total seconds of the current phase's configured duration.
    pub fn total_seconds(&self) -> u32 {
        let minutes = match self.phase {
            Phase::Focus => self.config.focus_minutes,
            Phase::Break => self.config.break_minutes,
        };
        minutes.saturating_mul(60)
    }

    /// Fraction of the current phase already elapsed, clamped to [0, 1].
    pub fn progress_fraction(&self) -> f32 {
        let total = self.total_seconds();
        if total == 0 {
            return 0.0;
        }
        let elapsed = total.saturating_sub(self.remaining_seconds) as f32;
        (elapsed / total as f32).clamp(0.0, 1.0)
    }
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum IpcRequest {
    /// Start (or resume) the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Flip between running and paused
    Toggle,
    /// Reset to a fresh focus phase
    Reset,
    /// Query the current state
    Status,
    /// Change the focus duration (minutes > 0; rejected while running)
    SetFocusDuration { minutes: u32 },
    /// Change the break duration (minutes > 0; rejected while running)
    SetBreakDuration { minutes: u32 },
    /// Change the persisted timer style
    SetTimerStyle { style: TimerStyle },
    /// Enable or disable the transition tone
    SetSoundEnabled { enabled: bool },
    /// Change the tone preset
    SetSoundPreset { preset: SoundPreset },
    /// Change the tone volume (validated to [0, 1])
    SetSoundVolume { volume: f32 },
    /// Enable or disable desktop notifications
    SetNotificationsEnabled { enabled: bool },
    /// Change the persisted theme
    SetTheme { theme: Theme },
}

/// Observable state exposed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    /// Current phase ("focus" or "break")
    pub phase: String,
    /// Whole minutes remaining
    pub remaining_minutes: u32,
    /// Seconds within the current minute
    pub remaining_seconds: u32,
    /// Whether the countdown is active
    pub running: bool,
    /// Completed focus sessions
    pub sessions_completed: u32,
    /// Elapsed fraction of the current phase, in [0, 1]
    pub progress: f32,
}

impl ResponseData {
    /// Creates response data from the timer state.
    pub fn from_timer_state(state: &TimerState) -> Self {
        Self {
            phase: state.phase.as_str().to_string(),
            remaining_minutes: state.remaining_minutes(),
            remaining_seconds: state.remaining_secs_in_minute(),
            running: state.running,
            sessions_completed: state.sessions_completed,
            progress: state.progress_fraction(),
        }
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional state snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
