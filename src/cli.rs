//! Command-line interface for wordwatch
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Live keyword monitoring over a streamed transcription session
#[derive(Parser, Debug)]
#[command(
    name = "wordwatch",
    version,
    about = "Live keyword monitoring over a streamed transcription session"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Audio input device (e.g., hw:0)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Keyword spec, repeatable. Examples: "TARIFFS:5", "3+ ELECTION", "AI+++"
    #[arg(short, long = "keyword", value_name = "SPEC")]
    pub keywords: Vec<String>,

    /// Read session audio from a WAV file instead of the microphone
    #[arg(long, value_name = "PATH")]
    pub wav: Option<PathBuf>,

    /// Read WAV audio from stdin (disables inbound message reading)
    #[arg(long)]
    pub stdin_audio: bool,

    /// Do not schedule audio replies for playback
    #[arg(long)]
    pub no_voice_replies: bool,

    /// Directory for the exported transcript (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,
}
