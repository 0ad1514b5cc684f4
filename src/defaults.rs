//! Default configuration constants for wordwatch.
//!
//! Shared constants used across configuration types and session components,
//! kept in one place to ensure consistency and eliminate duplication.

/// Audio capture sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and what the transcription
/// transport expects for outbound chunks.
pub const SAMPLE_RATE: u32 = 16_000;

/// Sample rate of inline audio replies from the transcription transport, in Hz.
pub const PLAYBACK_SAMPLE_RATE: u32 = 24_000;

/// Samples per capture frame (~256ms at 16kHz).
pub const FRAME_SIZE: usize = 4096;

/// MIME type tag for outbound PCM chunks.
pub const PCM_MIME_TYPE: &str = "audio/pcm;rate=16000";

// ── Adaptive gain ────────────────────────────────────────────────────────

/// Peak level the gain normalizer steers frames toward.
pub const TARGET_PEAK: f32 = 0.7;

/// Lower clamp for the computed gain.
pub const MIN_GAIN: f32 = 0.25;

/// Upper clamp for the computed gain.
pub const MAX_GAIN: f32 = 4.0;

/// Exponential smoothing factor for gain adjustment per frame.
///
/// Small on purpose: the gain drifts toward its target over many frames
/// instead of pumping on every loudness change.
pub const GAIN_SMOOTHING: f32 = 0.02;

/// Peak magnitude below which a frame is treated as silence.
///
/// Silent frames exert no pressure on the gain in either direction.
pub const SILENCE_PEAK: f32 = 0.01;

// ── Adaptive send buffer ─────────────────────────────────────────────────

/// Initial flush threshold for the send buffer, in samples (~0.5s at 16kHz).
pub const INITIAL_BUFFER_SAMPLES: usize = 4096 * 2;

/// Minimum flush threshold, in samples (~0.25s at 16kHz).
pub const MIN_BUFFER_SAMPLES: usize = 4096;

/// Maximum flush threshold, in samples (~2.5s at 16kHz).
pub const MAX_BUFFER_SAMPLES: usize = 4096 * 10;

/// Inter-message gap above which the send buffer grows, in milliseconds.
pub const HIGH_LATENCY_THRESHOLD_MS: u64 = 800;

/// Inter-message gap below which the send buffer shrinks, in milliseconds.
pub const LOW_LATENCY_THRESHOLD_MS: u64 = 300;

/// Multiplicative step for growing/shrinking the send buffer threshold.
pub const BUFFER_ADAPT_FACTOR: f64 = 1.5;

// ── Transcript and detections ────────────────────────────────────────────

/// Number of recent words kept in the bounded display window.
pub const DISPLAY_WINDOW_WORDS: usize = 100;

/// Number of recent detection events kept in the bounded live log.
pub const DETECTION_LOG_LIMIT: usize = 100;

/// How long a keyword stays marked as newly-mentioned after reaching its
/// target, in milliseconds. A presentation pulse, not persistent state.
pub const MENTION_PULSE_MS: u64 = 1500;

// ── Correlation ──────────────────────────────────────────────────────────

/// Maximum gap between adjacent detections of different keywords for them
/// to count as a proximity pair, in seconds.
pub const PROXIMITY_THRESHOLD_SECS: f64 = 5.0;

/// Number of proximity pairs between the same two keywords required to
/// report a tension relationship.
pub const TENSION_LINE_THRESHOLD: usize = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_clamps_are_ordered() {
        assert!(MIN_GAIN < 1.0);
        assert!(MAX_GAIN > 1.0);
        assert!(MIN_GAIN < MAX_GAIN);
        assert!(TARGET_PEAK > SILENCE_PEAK);
    }

    #[test]
    fn test_buffer_bounds_are_ordered() {
        assert!(MIN_BUFFER_SAMPLES <= INITIAL_BUFFER_SAMPLES);
        assert!(INITIAL_BUFFER_SAMPLES <= MAX_BUFFER_SAMPLES);
    }

    #[test]
    fn test_latency_thresholds_are_ordered() {
        assert!(LOW_LATENCY_THRESHOLD_MS < HIGH_LATENCY_THRESHOLD_MS);
    }

    #[test]
    fn test_mime_type_carries_sample_rate() {
        assert!(PCM_MIME_TYPE.contains("16000"));
    }
}
