//! Display utilities for the focus timer CLI.
//!
//! This module provides formatted output for:
//! - Command acknowledgements
//! - Status display with remaining time and progress
//! - Error messages

use crate::types::IpcResponse;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the acknowledgement for a timer command (start, pause,
    /// toggle, reset), with the remaining time when available.
    pub fn show_ack(response: &IpcResponse) {
        println!("{}", response.message);

        if let Some(data) = &response.data {
            println!(
                "  {} {}",
                Self::phase_label(&data.phase),
                Self::format_clock(data.remaining_minutes, data.remaining_seconds)
            );
        }
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        let Some(data) = &response.data else {
            println!("The timer daemon is not running");
            return;
        };

        let state = if data.running { "running" } else { "paused" };

        println!("{} ({})", Self::phase_label(&data.phase), state);
        println!(
            "  remaining: {}",
            Self::format_clock(data.remaining_minutes, data.remaining_seconds)
        );
        println!("  progress:  {:.0}%", data.progress * 100.0);
        println!("  sessions:  {}", data.sessions_completed);
    }

    /// Shows the acknowledgement for a settings change.
    pub fn show_config(response: &IpcResponse) {
        println!("{}", response.message);
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Formats a remaining time as MM:SS.
    fn format_clock(minutes: u32, seconds: u32) -> String {
        format!("{:02}:{:02}", minutes, seconds)
    }

    /// Human label for a phase wire string.
    fn phase_label(phase: &str) -> &'static str {
        match phase {
            "focus" => "Focus",
            "break" => "Break",
            _ => "Timer",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
