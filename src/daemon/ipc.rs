//! IPC server for the focus timer daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for timer and preference commands
//! - Integration with TimerEngine and PreferenceStore

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};

use crate::notification::Notifier;
use crate::prefs::PreferenceStore;
use crate::types::{IpcRequest, IpcResponse, ResponseData};

use super::timer::TimerEngine;

// ============================================================================
// Constants
// ============================================================================

/// Socket file name under the config directory
pub const SOCKET_FILE: &str = "focustick.sock";

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Socket binding error
    #[error("Failed to bind socket: {0}")]
    BindError(String),

    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Write error
    #[error("Failed to write response: {0}")]
    WriteError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        // Remove existing socket file if present
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            anyhow::bail!("Connection closed by client");
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        // Clean up socket file on drop
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

/// Returns the default socket path under the config directory.
pub fn default_socket_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(crate::prefs::CONFIG_DIR).join(SOCKET_FILE))
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the engine and the store.
pub struct RequestHandler {
    /// Shared reference to the timer engine
    engine: Arc<Mutex<TimerEngine>>,
    /// Shared reference to the preference store
    prefs: Arc<Mutex<PreferenceStore>>,
    /// Notifier, for the permission reset on re-enable
    notifier: Arc<dyn Notifier>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(
        engine: Arc<Mutex<TimerEngine>>,
        prefs: Arc<Mutex<PreferenceStore>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            engine,
            prefs,
            notifier,
        }
    }

    /// Handles an IPC request and returns the appropriate response.
    ///
    /// Rejected timer commands (start while running, duration change
    /// while running) are not errors: the state is simply unchanged and
    /// the message says so.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::Start => self.handle_start().await,
            IpcRequest::Pause => self.handle_pause().await,
            IpcRequest::Toggle => self.handle_toggle().await,
            IpcRequest::Reset => self.handle_reset().await,
            IpcRequest::Status => self.handle_status().await,
            IpcRequest::SetFocusDuration { minutes } => self.handle_set_focus(minutes).await,
            IpcRequest::SetBreakDuration { minutes } => self.handle_set_break(minutes).await,
            IpcRequest::SetTimerStyle { style } => {
                self.prefs.lock().await.set_timer_style(style);
                IpcResponse::success(format!("Timer style set to {}", style.as_str()), None)
            }
            IpcRequest::SetSoundEnabled { enabled } => {
                self.prefs.lock().await.set_sound_enabled(enabled);
                let word = if enabled { "enabled" } else { "disabled" };
                IpcResponse::success(format!("Sound {word}"), None)
            }
            IpcRequest::SetSoundPreset { preset } => {
                self.prefs.lock().await.set_sound_preset(preset);
                IpcResponse::success(format!("Sound preset set to {}", preset.as_str()), None)
            }
            IpcRequest::SetSoundVolume { volume } => {
                if self.prefs.lock().await.set_sound_volume(volume) {
                    IpcResponse::success(format!("Volume set to {volume:.2}"), None)
                } else {
                    IpcResponse::error("Volume must be between 0.0 and 1.0")
                }
            }
            IpcRequest::SetNotificationsEnabled { enabled } => {
                self.prefs
                    .lock()
                    .await
                    .set_desktop_notifications_enabled(enabled);
                if enabled {
                    // Re-enabling clears a previous denial so the next
                    // transition attempts delivery again.
                    self.notifier.reset_permission();
                }
                let word = if enabled { "enabled" } else { "disabled" };
                IpcResponse::success(format!("Notifications {word}"), None)
            }
            IpcRequest::SetTheme { theme } => {
                self.prefs.lock().await.set_theme(theme);
                IpcResponse::success(format!("Theme set to {}", theme.as_str()), None)
            }
        }
    }

    /// Handles the start command.
    async fn handle_start(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        let message = if engine.start() {
            "Timer started"
        } else {
            "Timer is already running"
        };
        IpcResponse::success(message, Some(ResponseData::from_timer_state(engine.state())))
    }

    /// Handles the pause command.
    async fn handle_pause(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        let message = if engine.pause() {
            "Timer paused"
        } else {
            "Timer is not running"
        };
        IpcResponse::success(message, Some(ResponseData::from_timer_state(engine.state())))
    }

    /// Handles the toggle command.
    async fn handle_toggle(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        let message = if engine.toggle() {
            "Timer started"
        } else {
            "Timer paused"
        };
        IpcResponse::success(message, Some(ResponseData::from_timer_state(engine.state())))
    }

    /// Handles the reset command.
    async fn handle_reset(&self) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        engine.reset();
        IpcResponse::success(
            "Timer reset",
            Some(ResponseData::from_timer_state(engine.state())),
        )
    }

    /// Handles the status command.
    async fn handle_status(&self) -> IpcResponse {
        let engine = self.engine.lock().await;

        IpcResponse::success("", Some(ResponseData::from_timer_state(engine.state())))
    }

    /// Handles a focus duration change.
    ///
    /// The persisted preference only follows a change the engine
    /// accepted, so store and countdown never disagree.
    async fn handle_set_focus(&self, minutes: u32) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        if !engine.set_focus_minutes(minutes) {
            return IpcResponse::success(
                "Focus duration unchanged (pause the timer and use a positive value)",
                Some(ResponseData::from_timer_state(engine.state())),
            );
        }

        self.prefs.lock().await.set_focus_duration(minutes);
        IpcResponse::success(
            format!("Focus duration set to {minutes} minutes"),
            Some(ResponseData::from_timer_state(engine.state())),
        )
    }

    /// Handles a break duration change.
    async fn handle_set_break(&self, minutes: u32) -> IpcResponse {
        let mut engine = self.engine.lock().await;

        if !engine.set_break_minutes(minutes) {
            return IpcResponse::success(
                "Break duration unchanged (pause the timer and use a positive value)",
                Some(ResponseData::from_timer_state(engine.state())),
            );
        }

        self.prefs.lock().await.set_break_duration(minutes);
        IpcResponse::success(
            format!("Break duration set to {minutes} minutes"),
            Some(ResponseData::from_timer_state(engine.state())),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::daemon::timer::TimerEvent;
    use crate::notification::MockNotifier;
    use crate::types::TimerConfig;

    // ------------------------------------------------------------------------
    // Helper functions
    // ------------------------------------------------------------------------

    fn create_temp_socket_path() -> PathBuf {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sock");
        // Keep the directory so it's not deleted
        std::mem::forget(dir);
        path
    }

    fn create_handler() -> (
        RequestHandler,
        Arc<Mutex<TimerEngine>>,
        Arc<MockNotifier>,
        mpsc::UnboundedReceiver<TimerEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = Arc::new(Mutex::new(TimerEngine::new(TimerConfig::default(), tx)));
        let prefs = Arc::new(Mutex::new(PreferenceStore::in_memory()));
        let notifier = Arc::new(MockNotifier::new());
        let handler = RequestHandler::new(
            Arc::clone(&engine),
            prefs,
            Arc::clone(&notifier) as Arc<dyn Notifier>,
        );
        (handler, engine, notifier, rx)
    }

    // ------------------------------------------------------------------------
    // IpcServer Tests
    // ------------------------------------------------------------------------

    mod ipc_server_tests {
        use super::*;

        #[tokio::test]
        async fn test_server_creation() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path);

            assert!(server.is_ok());
            assert!(socket_path.exists());

            drop(server);
        }

        #[tokio::test]
        async fn test_server_removes_existing_socket() {
            let socket_path = create_temp_socket_path();

            // Create a dummy file at the socket path
            std::fs::write(&socket_path, "dummy").unwrap();

            // Server should remove it and bind successfully
            let server = IpcServer::new(&socket_path);
            assert!(server.is_ok());
        }

        #[tokio::test]
        async fn test_server_creates_parent_directory() {
            let dir = tempfile::tempdir().unwrap();
            let socket_path = dir.path().join("subdir").join("test.sock");

            let server = IpcServer::new(&socket_path);
            assert!(server.is_ok());
            assert!(socket_path.parent().unwrap().exists());
        }

        #[tokio::test]
        async fn test_receive_request_status() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let client_handle = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let mut stream = UnixStream::connect(&client_path).await.unwrap();
                let request = r#"{"command":"status"}"#;
                stream.write_all(request.as_bytes()).await.unwrap();
                stream.flush().await.unwrap();
            });

            let mut stream = server.accept().await.unwrap();
            let request = IpcServer::receive_request(&mut stream).await;

            assert!(request.is_ok());
            assert!(matches!(request.unwrap(), IpcRequest::Status));

            client_handle.await.unwrap();
        }

        #[tokio::test]
        async fn test_receive_request_set_focus_duration() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let client_handle = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let mut stream = UnixStream::connect(&client_path).await.unwrap();
                let request = r#"{"command":"setFocusDuration","minutes":50}"#;
                stream.write_all(request.as_bytes()).await.unwrap();
                stream.flush().await.unwrap();
            });

            let mut stream = server.accept().await.unwrap();
            let request = IpcServer::receive_request(&mut stream).await;

            assert!(request.is_ok());
            assert_eq!(
                request.unwrap(),
                IpcRequest::SetFocusDuration { minutes: 50 }
            );

            client_handle.await.unwrap();
        }

        #[tokio::test]
        async fn test_send_response() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let client_handle = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let mut stream = UnixStream::connect(&client_path).await.unwrap();

                let mut buffer = vec![0u8; 4096];
                let n = stream.read(&mut buffer).await.unwrap();
                serde_json::from_slice::<IpcResponse>(&buffer[..n]).unwrap()
            });

            let mut stream = server.accept().await.unwrap();
            let response = IpcResponse::success("Test message", None);
            IpcServer::send_response(&mut stream, &response)
                .await
                .unwrap();

            let received = client_handle.await.unwrap();
            assert_eq!(received.status, "success");
            assert_eq!(received.message, "Test message");
        }

        #[tokio::test]
        async fn test_receive_request_invalid_json() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let _client_handle = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let mut stream = UnixStream::connect(&client_path).await.unwrap();
                let invalid_json = "not valid json";
                stream.write_all(invalid_json.as_bytes()).await.unwrap();
                stream.flush().await.unwrap();
            });

            let mut stream = server.accept().await.unwrap();
            let request = IpcServer::receive_request(&mut stream).await;

            assert!(request.is_err());
        }

        #[tokio::test]
        async fn test_server_drop_cleanup() {
            let socket_path = create_temp_socket_path();

            {
                let _server = IpcServer::new(&socket_path).unwrap();
                assert!(socket_path.exists());
            }

            // Socket file should be removed after drop
            assert!(!socket_path.exists());
        }
    }

    // ------------------------------------------------------------------------
    // RequestHandler Tests
    // ------------------------------------------------------------------------

    mod request_handler_tests {
        use super::*;

        #[tokio::test]
        async fn test_handle_status() {
            let (handler, _engine, _notifier, _rx) = create_handler();

            let response = handler.handle(IpcRequest::Status).await;

            assert_eq!(response.status, "success");
            let data = response.data.unwrap();
            assert_eq!(data.phase, "focus");
            assert_eq!(data.remaining_minutes, 25);
            assert_eq!(data.remaining_seconds, 0);
            assert!(!data.running);
            assert_eq!(data.sessions_completed, 0);
        }

        #[tokio::test]
        async fn test_handle_start() {
            let (handler, _engine, _notifier, _rx) = create_handler();

            let response = handler.handle(IpcRequest::Start).await;

            assert_eq!(response.status, "success");
            assert_eq!(response.message, "Timer started");
            assert!(response.data.unwrap().running);
        }

        #[tokio::test]
        async fn test_handle_start_already_running() {
            let (handler, _engine, _notifier, _rx) = create_handler();

            handler.handle(IpcRequest::Start).await;
            let response = handler.handle(IpcRequest::Start).await;

            assert_eq!(response.status, "success");
            assert_eq!(response.message, "Timer is already running");
            assert!(response.data.unwrap().running);
        }

        #[tokio::test]
        async fn test_handle_pause_not_running() {
            let (handler, _engine, _notifier, _rx) = create_handler();

            let response = handler.handle(IpcRequest::Pause).await;

            assert_eq!(response.status, "success");
            assert_eq!(response.message, "Timer is not running");
            assert!(!response.data.unwrap().running);
        }

        #[tokio::test]
        async fn test_handle_toggle() {
            let (handler, _engine, _notifier, _rx) = create_handler();

            let response = handler.handle(IpcRequest::Toggle).await;
            assert_eq!(response.message, "Timer started");
            assert!(response.data.unwrap().running);

            let response = handler.handle(IpcRequest::Toggle).await;
            assert_eq!(response.message, "Timer paused");
            assert!(!response.data.unwrap().running);
        }

        #[tokio::test]
        async fn test_handle_reset() {
            let (handler, engine, _notifier, _rx) = create_handler();

            handler.handle(IpcRequest::Start).await;
            engine.lock().await.state_mut().remaining_seconds = 10;

            let response = handler.handle(IpcRequest::Reset).await;

            assert_eq!(response.message, "Timer reset");
            let data = response.data.unwrap();
            assert_eq!(data.remaining_minutes, 25);
            assert!(!data.running);
        }

        #[tokio::test]
        async fn test_handle_set_focus_duration() {
            let (handler, _engine, _notifier, _rx) = create_handler();

            let response = handler
                .handle(IpcRequest::SetFocusDuration { minutes: 50 })
                .await;

            assert_eq!(response.message, "Focus duration set to 50 minutes");
            assert_eq!(response.data.unwrap().remaining_minutes, 50);
        }

        #[tokio::test]
        async fn test_handle_set_focus_duration_while_running() {
            let (handler, _engine, _notifier, _rx) = create_handler();

            handler.handle(IpcRequest::Start).await;
            let response = handler
                .handle(IpcRequest::SetFocusDuration { minutes: 50 })
                .await;

            assert_eq!(response.status, "success");
            assert!(response.message.contains("unchanged"));
            assert_eq!(response.data.unwrap().remaining_minutes, 25);
        }

        #[tokio::test]
        async fn test_handle_set_sound_volume_rejects_out_of_range() {
            let (handler, _engine, _notifier, _rx) = create_handler();

            let response = handler
                .handle(IpcRequest::SetSoundVolume { volume: 1.5 })
                .await;

            assert_eq!(response.status, "error");
        }

        #[tokio::test]
        async fn test_enabling_notifications_resets_permission() {
            let (handler, _engine, notifier, _rx) = create_handler();

            // Drive the mock into the denied steady state
            notifier.set_should_fail(true);
            notifier.notify("a", "b");
            assert_eq!(
                notifier.permission(),
                crate::notification::PermissionState::Denied
            );

            handler
                .handle(IpcRequest::SetNotificationsEnabled { enabled: true })
                .await;

            assert_eq!(
                notifier.permission(),
                crate::notification::PermissionState::Undetermined
            );
        }
    }

    // ------------------------------------------------------------------------
    // Integration Tests
    // ------------------------------------------------------------------------

    mod integration_tests {
        use super::*;

        #[tokio::test]
        async fn test_full_ipc_flow() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();
            let (handler, _engine, _notifier, _rx) = create_handler();

            let client_path = socket_path.clone();
            let client_handle = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let mut stream = UnixStream::connect(&client_path).await.unwrap();

                let request = r#"{"command":"start"}"#;
                stream.write_all(request.as_bytes()).await.unwrap();
                stream.flush().await.unwrap();

                let mut buffer = vec![0u8; 4096];
                let n = stream.read(&mut buffer).await.unwrap();
                serde_json::from_slice::<IpcResponse>(&buffer[..n]).unwrap()
            });

            let mut stream = server.accept().await.unwrap();
            let request = IpcServer::receive_request(&mut stream).await.unwrap();
            let response = handler.handle(request).await;
            IpcServer::send_response(&mut stream, &response)
                .await
                .unwrap();

            let client_response = client_handle.await.unwrap();
            assert_eq!(client_response.status, "success");
            assert_eq!(client_response.message, "Timer started");

            let data = client_response.data.unwrap();
            assert_eq!(data.phase, "focus");
            assert!(data.running);
        }

        #[tokio::test]
        async fn test_all_commands_flow() {
            let (handler, _engine, _notifier, _rx) = create_handler();

            // start -> pause -> toggle -> reset -> status
            let commands = vec![
                (r#"{"command":"start"}"#, true),
                (r#"{"command":"pause"}"#, false),
                (r#"{"command":"toggle"}"#, true),
                (r#"{"command":"reset"}"#, false),
                (r#"{"command":"status"}"#, false),
            ];

            for (cmd_json, expect_running) in commands {
                let request: IpcRequest = serde_json::from_str(cmd_json).unwrap();
                let response = handler.handle(request).await;

                assert_eq!(response.status, "success", "Command: {}", cmd_json);
                assert_eq!(
                    response.data.unwrap().running,
                    expect_running,
                    "Command: {}",
                    cmd_json
                );
            }
        }
    }

    // ------------------------------------------------------------------------
    // Error Handling Tests
    // ------------------------------------------------------------------------

    mod error_tests {
        use super::*;

        #[tokio::test]
        async fn test_connection_closed() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let _client = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let stream = UnixStream::connect(&client_path).await.unwrap();
                // Close immediately without sending anything
                drop(stream);
            });

            let mut stream = server.accept().await.unwrap();
            let result = IpcServer::receive_request(&mut stream).await;

            assert!(result.is_err());
        }

        #[tokio::test]
        async fn test_ipc_error_display() {
            let err = IpcError::BindError("test error".to_string());
            assert_eq!(err.to_string(), "Failed to bind socket: test error");

            let err = IpcError::Timeout;
            assert_eq!(err.to_string(), "Operation timed out");

            let err = IpcError::RequestTooLarge;
            assert!(err.to_string().contains("4096"));
        }
    }
}
