//! Focus timer CLI - alternating focus/break countdowns
//!
//! This tool helps you stay focused with timed sessions:
//! - Configurable focus sessions (25 minutes by default)
//! - Configurable breaks (5 minutes by default)
//! - Transition tones and desktop notifications

use anyhow::Result;
use clap::{CommandFactory, Parser};

use focustick::cli::{Cli, Commands, ConfigCommands, Display, IpcClient};
use focustick::daemon;
use focustick::types::IpcRequest;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse();

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Start) => {
            let client = IpcClient::new()?;
            let response = client.start().await?;
            Display::show_ack(&response);
        }
        Some(Commands::Pause) => {
            let client = IpcClient::new()?;
            let response = client.pause().await?;
            Display::show_ack(&response);
        }
        Some(Commands::Toggle) => {
            let client = IpcClient::new()?;
            let response = client.toggle().await?;
            Display::show_ack(&response);
        }
        Some(Commands::Reset) => {
            let client = IpcClient::new()?;
            let response = client.reset().await?;
            Display::show_ack(&response);
        }
        Some(Commands::Status) => {
            let client = IpcClient::new()?;
            let response = client.status().await?;
            Display::show_status(&response);
        }
        Some(Commands::Config(config)) => {
            let client = IpcClient::new()?;
            let response = client.send(config_request(config)).await?;
            Display::show_config(&response);
        }
        Some(Commands::Daemon) => {
            daemon::run_daemon().await?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Maps a config subcommand to its IPC request.
fn config_request(config: ConfigCommands) -> IpcRequest {
    match config {
        ConfigCommands::Focus { minutes } => IpcRequest::SetFocusDuration { minutes },
        ConfigCommands::Break { minutes } => IpcRequest::SetBreakDuration { minutes },
        ConfigCommands::Style { style } => IpcRequest::SetTimerStyle { style },
        ConfigCommands::Sound { enabled } => IpcRequest::SetSoundEnabled { enabled },
        ConfigCommands::Preset { preset } => IpcRequest::SetSoundPreset { preset },
        ConfigCommands::Volume { volume } => IpcRequest::SetSoundVolume { volume },
        ConfigCommands::Notify { enabled } => IpcRequest::SetNotificationsEnabled { enabled },
        ConfigCommands::Theme { theme } => IpcRequest::SetTheme { theme },
    }
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
