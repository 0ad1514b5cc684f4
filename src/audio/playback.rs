//! Scheduling for inline audio replies.
//!
//! Audio replies arrive as base64 PCM16 at 24kHz and must play back to back
//! without gaps even when chunks arrive in bursts. The queue keeps a
//! next-start cursor: each clip is scheduled at the later of "now" and the
//! end of the previous clip.

use crate::audio::pcm::{decode_pcm16_base64, duration_secs};
use crate::defaults::PLAYBACK_SAMPLE_RATE;
use crate::error::Result;

/// A decoded audio reply clip with its scheduled start time.
#[derive(Debug, Clone)]
pub struct ScheduledClip {
    pub samples: Vec<f32>,
    /// Seconds on the session clock when this clip should begin.
    pub start_at: f64,
    pub duration: f64,
}

/// Gapless scheduler for inbound audio reply clips.
pub struct PlaybackQueue {
    next_start: f64,
    active: Vec<ScheduledClip>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self {
            next_start: 0.0,
            active: Vec::new(),
        }
    }

    /// Decodes a base64 PCM16 payload and schedules it after any clip
    /// already queued.
    ///
    /// # Errors
    /// Returns `PlaybackDecode` for malformed payloads; the queue is left
    /// unchanged so later clips still schedule correctly.
    pub fn enqueue(&mut self, data: &str, now: f64) -> Result<&ScheduledClip> {
        let samples = decode_pcm16_base64(data)?;
        let duration = duration_secs(samples.len(), PLAYBACK_SAMPLE_RATE);

        let start_at = self.next_start.max(now);
        self.next_start = start_at + duration;

        self.active.push(ScheduledClip {
            samples,
            start_at,
            duration,
        });
        let last = self.active.len() - 1;
        Ok(&self.active[last])
    }

    /// Clips currently scheduled or playing.
    pub fn active_clips(&self) -> &[ScheduledClip] {
        &self.active
    }

    /// Drops clips that have finished by the given time.
    pub fn prune_finished(&mut self, now: f64) {
        self.active.retain(|c| c.start_at + c.duration > now);
    }

    /// Stops everything and resets the cursor. Idempotent.
    pub fn stop_all(&mut self) {
        self.active.clear();
        self.next_start = 0.0;
    }
}

impl Default for PlaybackQueue {
    fn default() -> Self {
        Self::new()
    }
}
