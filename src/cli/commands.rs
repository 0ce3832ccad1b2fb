//! Command definitions for the focus timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use clap::{Parser, Subcommand};

use crate::types::{SoundPreset, Theme, TimerStyle};

// ============================================================================
// CLI Structure
// ============================================================================

/// Focus timer CLI - alternating focus/break countdowns
#[derive(Parser, Debug)]
#[command(
    name = "focustick",
    version,
    about = "A focus/break countdown timer",
    long_about = "A terminal focus timer that alternates focus sessions and breaks,\n\
                  with transition tones, desktop notifications and persisted settings.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start (or resume) the countdown
    Start,

    /// Pause the countdown
    Pause,

    /// Start when paused, pause when running
    Toggle,

    /// Reset to a fresh focus session (completed sessions are kept)
    Reset,

    /// Show current timer status
    Status,

    /// Change a setting
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Run the timer daemon (background service)
    Daemon,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Settings subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Set the focus duration in minutes (common choices: 15, 25, 50)
    Focus {
        /// Minutes per focus session (> 0)
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        minutes: u32,
    },

    /// Set the break duration in minutes (common choices: 5, 10, 15)
    Break {
        /// Minutes per break (> 0)
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        minutes: u32,
    },

    /// Set the visual timer style
    Style {
        /// One of: circle, pill, minimal
        #[arg(value_parser = parse_style)]
        style: TimerStyle,
    },

    /// Enable or disable the transition tone
    Sound {
        /// "on" or "off"
        #[arg(value_parser = parse_on_off, action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// Set the transition tone preset
    Preset {
        /// One of: chime, bell, digital
        #[arg(value_parser = parse_preset)]
        preset: SoundPreset,
    },

    /// Set the transition tone volume
    Volume {
        /// Volume between 0.0 and 1.0
        #[arg(value_parser = parse_volume)]
        volume: f32,
    },

    /// Enable or disable desktop notifications
    Notify {
        /// "on" or "off"
        #[arg(value_parser = parse_on_off, action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// Set the color theme
    Theme {
        /// "light" or "dark"
        #[arg(value_parser = parse_theme)]
        theme: Theme,
    },
}

// ============================================================================
// Value parsers
// ============================================================================

fn parse_on_off(s: &str) -> Result<bool, String> {
    match s {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(format!("expected 'on' or 'off', got '{s}'")),
    }
}

fn parse_theme(s: &str) -> Result<Theme, String> {
    match s {
        "light" => Ok(Theme::Light),
        "dark" => Ok(Theme::Dark),
        _ => Err(format!("expected 'light' or 'dark', got '{s}'")),
    }
}

fn parse_style(s: &str) -> Result<TimerStyle, String> {
    match s {
        "circle" => Ok(TimerStyle::Circle),
        "pill" => Ok(TimerStyle::Pill),
        "minimal" => Ok(TimerStyle::Minimal),
        _ => Err(format!(
            "expected 'circle', 'pill' or 'minimal', got '{s}'"
        )),
    }
}

fn parse_preset(s: &str) -> Result<SoundPreset, String> {
    match s {
        "chime" => Ok(SoundPreset::Chime),
        "bell" => Ok(SoundPreset::Bell),
        "digital" => Ok(SoundPreset::Digital),
        _ => Err(format!(
            "expected 'chime', 'bell' or 'digital', got '{s}'"
        )),
    }
}

fn parse_volume(s: &str) -> Result<f32, String> {
    let volume: f32 = s
        .parse()
        .map_err(|_| format!("expected a number, got '{s}'"))?;
    if !(0.0..=1.0).contains(&volume) {
        return Err("volume must be between 0.0 and 1.0".to_string());
    }
    Ok(volume)
}

// ============================================================================
// Tests
// ============================================================================
