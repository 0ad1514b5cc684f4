//! PCM16 encoding and decoding for the transcription transport.
//!
//! Outbound chunks are float samples converted to 16-bit little-endian PCM
//! and base64-encoded; inbound audio replies arrive as base64 PCM16 and are
//! decoded back to floats for playback scheduling.

use crate::error::{Result, WordwatchError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Converts float samples in [-1.0, 1.0] to a base64 string of PCM16-LE bytes.
pub fn encode_pcm16_base64(samples: &[f32]) -> String {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let value = (sample * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    STANDARD.encode(bytes)
}

/// Decodes a base64 string of PCM16-LE bytes back to float samples.
///
/// # Errors
/// Returns `PlaybackDecode` when the payload is not valid base64 or the
/// byte count is odd.
pub fn decode_pcm16_base64(data: &str) -> Result<Vec<f32>> {
    let bytes = STANDARD
        .decode(data)
        .map_err(|e| WordwatchError::PlaybackDecode {
            message: format!("invalid base64: {}", e),
        })?;

    if bytes.len() % 2 != 0 {
        return Err(WordwatchError::PlaybackDecode {
            message: format!("odd PCM16 byte count: {}", bytes.len()),
        });
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect())
}

/// Duration in seconds of a sample buffer at the given rate.
pub fn duration_secs(sample_count: usize, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    sample_count as f64 / sample_rate as f64
}
