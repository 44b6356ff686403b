//! Command-line parsing and command routing.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

use crate::commands;
use crate::logging;

/// A terminal speech recognition demo: record a short clip, watch the live
/// low-pass-filtered waveform, read the transcript.
#[derive(Parser)]
#[command(name = "parrot")]
#[command(version)]
#[command(about = "Record a clip, watch the waveform, read the transcript")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/parrot/parrot.toml\n    Logs:               ~/.local/state/parrot/parrot.log.*\n\nKEYS (record screen):\n    Enter/r             record & transcribe one session\n    q/Esc               quit\n\nSending SIGUSR1 to the process also triggers a session."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a clip with live visualization, then transcribe it (default)
    ///
    /// Each session records for the configured duration, writes clip0.wav
    /// beside the binary, and appends the transcript to the status log.
    #[command(visible_alias = "r")]
    Record,

    /// Transcribe a pre-recorded audio file
    ///
    /// Prints the transcript to stdout for piping to other commands.
    #[command(visible_alias = "t")]
    Transcribe {
        /// Path to the audio file to transcribe
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List available audio input devices
    ///
    /// Shows device indices, names, and configurations for parrot.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    Logs,

    /// Generate shell completion script
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Commands that don't need logging or config
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "parrot", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    logging::init_logging()?;

    match cli.command {
        None | Some(Commands::Record) => commands::handle_record().await,
        Some(Commands::Transcribe { file }) => commands::handle_transcribe(file).await,
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }
}
