//! Error types for wordwatch.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WordwatchError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors
    #[error("Permission to access the {source_type} was denied")]
    CapturePermissionDenied { source_type: String },

    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Transcription transport errors
    #[error("Transcription transport error: {message}")]
    Transport { message: String },

    #[error("Transcription transport authorization failed: {message}")]
    TransportAuthorization { message: String },

    // Playback errors (per-chunk, never fatal to the session)
    #[error("Audio reply decode failed: {message}")]
    PlaybackDecode { message: String },

    // Boundary validation errors
    #[error("Malformed transport payload: {message}")]
    MalformedPayload { message: String },

    // Keyword input validation errors
    #[error("Keyword cannot be empty")]
    EmptyKeyword,

    #[error("Keyword \"{name}\" already exists")]
    DuplicateKeyword { name: String },

    #[error("Keyword not found: {name}")]
    KeywordNotFound { name: String },

    // Session lifecycle errors
    #[error("Session is already closed")]
    SessionClosed,

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl WordwatchError {
    /// Whether this error must force a full session teardown.
    ///
    /// Transport-level failures release all session resources before they
    /// are surfaced; local/per-item errors never cascade to teardown.
    pub fn is_fatal_to_session(&self) -> bool {
        matches!(
            self,
            WordwatchError::Transport { .. } | WordwatchError::TransportAuthorization { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, WordwatchError>;
