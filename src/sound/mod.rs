//! Transition tone synthesis for the focus timer.
//!
//! This module produces the short audible cue fired at each phase
//! transition:
//!
//! - Three presets (chime, bell, digital) with fixed tone schedules
//! - Waveform synthesis via rodio signal generators
//! - Non-blocking playback with guaranteed sink teardown
//! - Graceful degradation when audio is unavailable
//!
//! The engine depends on the [`ToneSynthesizer`] trait, not the rodio
//! implementation, so it can run headless with a no-op or recording fake.

mod error;
pub mod preset;
mod synth;

pub use error::SoundError;
pub use preset::{schedule_for, Tone, ToneSchedule, Waveform};
pub use synth::{try_create_synth, RodioToneSynth};

use crate::types::{Phase, SoundPreset};

/// Trait for transition tone playback implementations.
///
/// Playback must be non-blocking; the cue plays in the background. A
/// failed play is reported but callers are expected to swallow it — the
/// countdown never depends on the cue.
pub trait ToneSynthesizer: Send + Sync {
    /// Plays the cue for the phase being entered.
    ///
    /// # Errors
    ///
    /// Returns an error if synthesis or playback fails.
    fn play(&self, entering: Phase, preset: SoundPreset, volume: f32) -> Result<(), SoundError>;

    /// Returns true if the audio system is available.
    fn is_available(&self) -> bool;
}

/// Recording tone synthesizer for testing.
#[derive(Debug, Default)]
pub struct MockToneSynth {
    play_calls: std::sync::Mutex<Vec<(Phase, SoundPreset, f32)>>,
    should_fail: std::sync::atomic::AtomicBool,
}

impl MockToneSynth {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().unwrap().len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<(Phase, SoundPreset, f32)> {
        self.play_calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.play_calls.lock().unwrap().clear();
    }
}

impl ToneSynthesizer for MockToneSynth {
    fn play(&self, entering: Phase, preset: SoundPreset, volume: f32) -> Result<(), SoundError> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("mock failure".to_string()));
        }
        self.play_calls
            .lock()
            .unwrap()
            .push((entering, preset, volume));
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }
}
