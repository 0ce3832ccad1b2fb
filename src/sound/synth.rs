//! Tone synthesizer implementation using rodio.
//!
//! Cues are synthesized with rodio's signal generators (no sound files):
//! each tone in the schedule is appended to a sink together with the
//! silence that precedes it, then the sink is detached so playback
//! finishes in the background and frees itself when the cue ends.

use std::sync::Arc;

use rodio::cpal::SampleRate;
use rodio::source::{Function, SignalGenerator, Source, Zero};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::error::SoundError;
use super::preset::{schedule_for, ToneSchedule, Waveform};
use super::ToneSynthesizer;
use crate::types::{Phase, SoundPreset};

/// Sample rate used for all generated tones.
const SAMPLE_RATE: u32 = 44_100;

/// A tone synthesizer backed by a rodio output stream.
///
/// Thread-safe; share it across tasks with `Arc`. Playback is
/// non-blocking and every cue releases its sink when it ends.
pub struct RodioToneSynth {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
}

impl RodioToneSynth {
    /// Creates a new synthesizer.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output
    /// device is available.
    pub fn new() -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
        })
    }

    /// Plays one cue from a schedule at the given volume.
    fn play_schedule(&self, schedule: &ToneSchedule, volume: f32) -> Result<(), SoundError> {
        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| SoundError::StreamError(e.to_string()))?;

        let function = match schedule.waveform {
            Waveform::Sine => Function::Sine,
            Waveform::Square => Function::Square,
        };

        let mut cursor = std::time::Duration::ZERO;
        for tone in &schedule.tones {
            if tone.offset > cursor {
                let silence = Zero::<f32>::new(1, SAMPLE_RATE).take_duration(tone.offset - cursor);
                sink.append(silence);
            }
            let wave =
                SignalGenerator::new(SampleRate(SAMPLE_RATE), tone.frequency, function.clone())
                .take_duration(tone.duration)
                .amplify(volume);
            sink.append(wave);
            cursor = tone.offset + tone.duration;
        }

        // Non-blocking: the sink drops itself once the cue finishes.
        sink.detach();

        debug!("Tone cue started ({} tones)", schedule.tones.len());
        Ok(())
    }
}

impl ToneSynthesizer for RodioToneSynth {
    fn play(&self, entering: Phase, preset: SoundPreset, volume: f32) -> Result<(), SoundError> {
        let volume = volume.clamp(0.0, 1.0);
        let schedule = schedule_for(preset, entering);
        self.play_schedule(&schedule, volume)
    }

    fn is_available(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for RodioToneSynth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioToneSynth").finish_non_exhaustive()
    }
}

/// Creates a synthesizer, returning None if audio is unavailable.
///
/// If audio initialization fails a warning is logged and the engine runs
/// without sound cues.
#[must_use]
pub fn try_create_synth() -> Option<Arc<RodioToneSynth>> {
    match RodioToneSynth::new() {
        Ok(synth) => Some(Arc::new(synth)),
        Err(e) => {
            warn!("Audio not available, transition tones disabled: {}", e);
            None
        }
    }
}
