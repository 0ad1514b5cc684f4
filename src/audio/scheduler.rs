//! Adaptive send-buffer scheduler for outbound audio chunks.
//!
//! Accumulates gain-adjusted frames and flushes them as one encoded chunk
//! once the queued sample count crosses an adaptive threshold. The threshold
//! tracks observed inbound message cadence: slow arrivals grow it (larger,
//! less frequent chunks), fast arrivals shrink it (lower latency).

use crate::audio::pcm::encode_pcm16_base64;
use crate::defaults::{
    BUFFER_ADAPT_FACTOR, HIGH_LATENCY_THRESHOLD_MS, INITIAL_BUFFER_SAMPLES, LOW_LATENCY_THRESHOLD_MS,
    MAX_BUFFER_SAMPLES, MIN_BUFFER_SAMPLES, PCM_MIME_TYPE,
};
use std::time::Instant;

/// A PCM16 chunk ready for transmission to the transcription transport.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EncodedChunk {
    /// Base64-encoded PCM16-LE mono samples.
    pub data: String,
    /// MIME type tagging the sample rate.
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// Accumulates audio frames and emits encoded chunks at an adaptive threshold.
pub struct AdaptiveBufferScheduler {
    queue: Vec<Vec<f32>>,
    queued_samples: usize,
    target_samples: usize,
    last_arrival: Option<Instant>,
}

impl AdaptiveBufferScheduler {
    /// Creates a scheduler with the default moderate threshold.
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            queued_samples: 0,
            target_samples: INITIAL_BUFFER_SAMPLES,
            last_arrival: None,
        }
    }

    /// Current flush threshold in samples.
    pub fn target_samples(&self) -> usize {
        self.target_samples
    }

    /// Number of samples currently queued.
    pub fn queued_samples(&self) -> usize {
        self.queued_samples
    }

    /// Resets queue, threshold, and arrival tracking for a new session.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.queued_samples = 0;
        self.target_samples = INITIAL_BUFFER_SAMPLES;
        self.last_arrival = None;
    }

    /// Queues one frame; returns an encoded chunk when the threshold is met.
    pub fn push_frame(&mut self, frame: Vec<f32>) -> Option<EncodedChunk> {
        self.queued_samples += frame.len();
        self.queue.push(frame);

        if self.queued_samples < self.target_samples {
            return None;
        }

        let mut combined = Vec::with_capacity(self.queued_samples);
        for frame in self.queue.drain(..) {
            combined.extend_from_slice(&frame);
        }
        self.queued_samples = 0;

        Some(EncodedChunk {
            data: encode_pcm16_base64(&combined),
            mime_type: PCM_MIME_TYPE.to_string(),
        })
    }

    /// Records an inbound message arrival and adapts the flush threshold.
    ///
    /// The first arrival only seeds the reference time; adaptation starts
    /// from the second message onward.
    pub fn note_message_arrival(&mut self, now: Instant) {
        if let Some(last) = self.last_arrival {
            let elapsed_ms = now.saturating_duration_since(last).as_millis() as u64;

            if elapsed_ms > HIGH_LATENCY_THRESHOLD_MS {
                let grown = (self.target_samples as f64 * BUFFER_ADAPT_FACTOR).ceil() as usize;
                self.target_samples = grown.min(MAX_BUFFER_SAMPLES);
            } else if elapsed_ms < LOW_LATENCY_THRESHOLD_MS {
                let shrunk = (self.target_samples as f64 / BUFFER_ADAPT_FACTOR).floor() as usize;
                self.target_samples = shrunk.max(MIN_BUFFER_SAMPLES);
            }
        }
        self.last_arrival = Some(now);
    }
}

impl Default for AdaptiveBufferScheduler {
    fn default() -> Self {
        Self::new()
    }
}
