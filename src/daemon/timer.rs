//! Timer engine for the focus timer.
//!
//! This module provides the core countdown functionality:
//! - Command handling (start/pause/toggle/reset/duration changes)
//! - Countdown with tokio::time::interval
//! - Transition event firing for tones and notifications
//!
//! The engine never blocks on its collaborators: transitions are
//! published on a channel and the effect dispatcher runs elsewhere, so
//! even a wedged sound device cannot stall the tick.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::types::{TimerConfig, TimerState, Transition};

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events consumed by the effect dispatcher and status listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown started (or resumed)
    Started,
    /// Countdown paused
    Paused,
    /// Timer reset to a fresh focus phase
    Reset,
    /// A focus session completed
    FocusCompleted {
        /// Total completed sessions after this one
        sessions_completed: u32,
        /// True when the configured break length is zero and the timer
        /// rolled straight into the next focus
        break_skipped: bool,
    },
    /// A break completed; the next focus session is already running
    BreakCompleted,
    /// One second elapsed
    Tick {
        /// Remaining seconds in the current phase
        remaining_seconds: u32,
    },
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Owns the countdown state and publishes transition events.
///
/// All mutation goes through this struct and callers hold it behind a
/// single `Arc<Mutex<..>>`, which is what makes the cancellation rule
/// hold: a tick that raced a pause takes the lock after the pause and
/// sees `running == false` before applying its decrement.
pub struct TimerEngine {
    /// Current countdown state
    state: TimerState,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates a new engine seeded from the given durations.
    pub fn new(config: TimerConfig, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            state: TimerState::new(config),
            event_tx,
        }
    }

    /// Runs the tick loop on a shared engine.
    ///
    /// Ticks every second; each tick takes the engine lock, so command
    /// handling and the countdown are serialized through one mutator.
    /// Returns when the event channel closes (daemon shutdown).
    pub async fn run(engine: Arc<Mutex<TimerEngine>>) -> Result<()> {
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let mut engine = engine.lock().await;
            if !engine.state.running {
                continue;
            }
            engine.on_tick()?;
        }
    }

    /// Applies one tick and publishes the resulting events.
    fn on_tick(&mut self) -> Result<()> {
        let transition = self.state.tick();

        self.event_tx
            .send(TimerEvent::Tick {
                remaining_seconds: self.state.remaining_seconds,
            })
            .context("Failed to send tick event")?;

        match transition {
            Some(Transition::FocusFinished { break_skipped }) => {
                self.event_tx
                    .send(TimerEvent::FocusCompleted {
                        sessions_completed: self.state.sessions_completed,
                        break_skipped,
                    })
                    .context("Failed to send focus completed event")?;
            }
            Some(Transition::BreakFinished) => {
                self.event_tx
                    .send(TimerEvent::BreakCompleted)
                    .context("Failed to send break completed event")?;
            }
            None => {}
        }

        Ok(())
    }

    /// Starts (or resumes) the countdown.
    ///
    /// Returns false (no event, state unchanged) if already running.
    pub fn start(&mut self) -> bool {
        if !self.state.start() {
            return false;
        }
        let _ = self.event_tx.send(TimerEvent::Started);
        true
    }

    /// Pauses the countdown.
    ///
    /// Returns false if already paused.
    pub fn pause(&mut self) -> bool {
        if !self.state.pause() {
            return false;
        }
        let _ = self.event_tx.send(TimerEvent::Paused);
        true
    }

    /// Flips between running and paused. Returns the new running state.
    pub fn toggle(&mut self) -> bool {
        if self.state.running {
            self.pause();
        } else {
            self.start();
        }
        self.state.running
    }

    /// Resets to a fresh idle focus phase. Always applies.
    pub fn reset(&mut self) {
        self.state.reset();
        let _ = self.event_tx.send(TimerEvent::Reset);
    }

    /// Changes the focus duration; silently rejected while running or
    /// for zero. Returns whether the change applied.
    pub fn set_focus_minutes(&mut self, minutes: u32) -> bool {
        self.state.set_focus_minutes(minutes)
    }

    /// Changes the break duration; same guards as focus.
    pub fn set_break_minutes(&mut self, minutes: u32) -> bool {
        self.state.set_break_minutes(minutes)
    }

    /// Returns a reference to the current countdown state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Returns a mutable reference to the state (for testing).
    #[cfg(test)]
    pub fn state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }
}

// ============================================================================
// Tests
// ============================================================================
