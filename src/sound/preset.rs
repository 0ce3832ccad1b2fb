//! Tone schedules for the sound presets.
//!
//! Each preset maps a destination phase to a short sequence of tones
//! (frequency, start offset, duration). The frequency sets come from the
//! original cue design: focus cues sit lower than break cues for chime,
//! and the other way around for bell and digital.

use std::time::Duration;

use crate::types::{Phase, SoundPreset};

/// Waveform family used by a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
}

/// A single tone within a schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Frequency in Hz
    pub frequency: f32,
    /// Start offset from the beginning of the cue
    pub offset: Duration,
    /// How long the tone sounds
    pub duration: Duration,
}

/// A complete cue: waveform plus the tones to play.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneSchedule {
    pub waveform: Waveform,
    pub tones: Vec<Tone>,
}

impl ToneSchedule {
    /// Total length of the cue, from start to the end of the last tone.
    pub fn total_duration(&self) -> Duration {
        self.tones
            .iter()
            .map(|t| t.offset + t.duration)
            .max()
            .unwrap_or_default()
    }
}

fn tone(frequency: f32, offset_ms: u64, duration_ms: u64) -> Tone {
    Tone {
        frequency,
        offset: Duration::from_millis(offset_ms),
        duration: Duration::from_millis(duration_ms),
    }
}

/// Builds the tone schedule for a preset and the phase being entered.
pub fn schedule_for(preset: SoundPreset, entering: Phase) -> ToneSchedule {
    match preset {
        SoundPreset::Chime => {
            let base = match entering {
                Phase::Focus => 520.0,
                Phase::Break => 660.0,
            };
            ToneSchedule {
                waveform: Waveform::Sine,
                tones: vec![tone(base, 0, 180), tone(base * 1.3, 200, 200)],
            }
        }
        SoundPreset::Bell => {
            let base = match entering {
                Phase::Focus => 880.0,
                Phase::Break => 600.0,
            };
            ToneSchedule {
                waveform: Waveform::Sine,
                tones: vec![tone(base, 0, 220), tone(base * 0.8, 240, 240)],
            }
        }
        SoundPreset::Digital => {
            let base = match entering {
                Phase::Focus => 1200.0,
                Phase::Break => 900.0,
            };
            ToneSchedule {
                waveform: Waveform::Square,
                tones: vec![
                    tone(base, 0, 120),
                    tone(base, 180, 120),
                    tone(base, 360, 120),
                ],
            }
        }
    }
}
