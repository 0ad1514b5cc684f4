//! wordwatch - live keyword monitoring over a streamed transcription session
//!
//! Captures audio, streams it to a transcription transport, reconciles the
//! cumulative transcript into word deltas, counts keyword mentions against
//! per-keyword targets, and correlates detections over the session.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod correlation;
pub mod defaults;
pub mod error;
pub mod keywords;
pub mod session;
pub mod transcript;
pub mod transport;

// Core seams (capture → session → transport)
pub use audio::capture::AudioSource;
pub use transport::TranscriptionTransport;

// Session
pub use session::{SessionController, SessionCounters, SessionEvent};

// Error handling
pub use error::{Result, WordwatchError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
