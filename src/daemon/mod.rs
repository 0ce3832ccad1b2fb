//! Daemon module for the focus timer.
//!
//! This module contains the core daemon functionality:
//! - `timer`: Timer engine with phase transitions and countdown logic
//! - `ipc`: Unix Domain Socket server and request dispatch
//!
//! `run_daemon` wires the pieces together: the engine ticks on its own
//! task, transition events flow to an effect dispatcher that plays the
//! tone and posts the notification, and the IPC loop serves clients.

pub mod ipc;
pub mod timer;

pub use ipc::{default_socket_path, IpcServer, RequestHandler, SOCKET_FILE};
pub use timer::{TimerEngine, TimerEvent};

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::notification::{DesktopNotifier, Notifier};
use crate::prefs::PreferenceStore;
use crate::sound::{try_create_synth, ToneSynthesizer};
use crate::types::{Phase, TimerConfig};

// ============================================================================
// Notification content
// ============================================================================

/// Title/body pair announcing the end of a focus session.
const FOCUS_FINISHED: (&str, &str) = ("Focus session finished", "Take a short break.");

/// Title/body pair announcing the end of a break.
const BREAK_FINISHED: (&str, &str) = ("Break finished", "Time to focus again.");

// ============================================================================
// Effect dispatcher
// ============================================================================

/// Consumes timer events and performs their side effects.
///
/// The tone and the notification both announce the phase being LEFT:
/// a finished focus plays the break cue even when a zero-length break
/// rolls straight into the next focus.
async fn dispatch_effects(
    mut events: mpsc::UnboundedReceiver<TimerEvent>,
    prefs: Arc<Mutex<PreferenceStore>>,
    synth: Option<Arc<dyn ToneSynthesizer>>,
    notifier: Arc<dyn Notifier>,
) {
    while let Some(event) = events.recv().await {
        let (entering, message) = match event {
            TimerEvent::FocusCompleted {
                sessions_completed, ..
            } => {
                info!("Focus session {} completed", sessions_completed);
                (Phase::Break, FOCUS_FINISHED)
            }
            TimerEvent::BreakCompleted => {
                info!("Break completed");
                (Phase::Focus, BREAK_FINISHED)
            }
            TimerEvent::Tick { remaining_seconds } => {
                debug!("Tick: {}s remaining", remaining_seconds);
                continue;
            }
            TimerEvent::Started | TimerEvent::Paused | TimerEvent::Reset => continue,
        };

        let (sound_enabled, preset, volume, notifications_enabled) = {
            let prefs = prefs.lock().await;
            let p = prefs.prefs();
            (
                p.sound_enabled,
                p.sound_preset,
                p.sound_volume,
                p.desktop_notifications_enabled,
            )
        };

        if sound_enabled {
            if let Some(synth) = &synth {
                if let Err(e) = synth.play(entering, preset, volume) {
                    warn!("Failed to play transition tone: {}", e);
                }
            }
        }

        if notifications_enabled {
            notifier.notify(message.0, message.1);
        }
    }
}

// ============================================================================
// Daemon entry point
// ============================================================================

/// Runs the daemon until SIGINT/SIGTERM.
///
/// Preferences seed the initial timer durations; the socket lives next
/// to the preference file under the config directory.
pub async fn run_daemon() -> Result<()> {
    let prefs = PreferenceStore::load();
    let config = TimerConfig::new(
        prefs.prefs().focus_duration_minutes,
        prefs.prefs().break_duration_minutes,
    );
    let prefs = Arc::new(Mutex::new(prefs));

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let engine = Arc::new(Mutex::new(TimerEngine::new(config, event_tx)));

    let synth = try_create_synth().map(|s| s as Arc<dyn ToneSynthesizer>);
    if synth.is_none() {
        warn!("No audio device available; transition tones disabled");
    }
    let notifier: Arc<dyn Notifier> = Arc::new(DesktopNotifier::new());

    let socket_path = default_socket_path().context("Could not determine home directory")?;
    let server = IpcServer::new(&socket_path)?;
    info!("Listening on {:?}", server.socket_path());

    let handler = Arc::new(RequestHandler::new(
        Arc::clone(&engine),
        Arc::clone(&prefs),
        Arc::clone(&notifier),
    ));

    let tick_task = tokio::spawn(TimerEngine::run(Arc::clone(&engine)));
    let effect_task = tokio::spawn(dispatch_effects(event_rx, prefs, synth, notifier));

    let result = serve(&server, handler).await;

    tick_task.abort();
    effect_task.abort();
    result
}

/// Accept loop; one connection handled at a time, which is plenty for a
/// single-user CLI.
async fn serve(server: &IpcServer, handler: Arc<RequestHandler>) -> Result<()> {
    loop {
        tokio::select! {
            accepted = server.accept() => {
                let mut stream = match accepted {
                    Ok(stream) => stream,
                    Err(e) => {
                        warn!("Failed to accept connection: {}", e);
                        continue;
                    }
                };

                let request = match IpcServer::receive_request(&mut stream).await {
                    Ok(request) => request,
                    Err(e) => {
                        debug!("Dropping connection: {}", e);
                        continue;
                    }
                };

                let response = handler.handle(request).await;
                if let Err(e) = IpcServer::send_response(&mut stream, &response).await {
                    warn!("Failed to send response: {}", e);
                }
            }
            _ = shutdown_signal() => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let ctrl_c = tokio::signal::ctrl_c();
    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            let _ = ctrl_c.await;
            return;
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = term.recv() => {}
    }
}

// ============================================================================
// Tests
// ============================================================================
