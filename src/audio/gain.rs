//! Adaptive gain normalization for captured audio frames.
//!
//! Steers frame peaks toward a target level with exponential smoothing so
//! quiet speakers are boosted and loud ones attenuated without pumping.

use crate::defaults::{GAIN_SMOOTHING, MAX_GAIN, MIN_GAIN, SILENCE_PEAK, TARGET_PEAK};

/// Per-frame adaptive gain control.
///
/// Stateful only in the current gain, which persists across frames for the
/// lifetime of a session. No error conditions.
#[derive(Debug, Clone)]
pub struct GainNormalizer {
    current_gain: f32,
}

impl GainNormalizer {
    /// Creates a normalizer with unity gain.
    pub fn new() -> Self {
        Self { current_gain: 1.0 }
    }

    /// Returns the current smoothed gain.
    pub fn current_gain(&self) -> f32 {
        self.current_gain
    }

    /// Resets the gain to unity for a new session.
    pub fn reset(&mut self) {
        self.current_gain = 1.0;
    }

    /// Target gain for a frame with the given peak, before smoothing.
    ///
    /// Silent frames (peak at or below the silence threshold) exert no
    /// pressure: the target equals the current gain.
    fn target_gain(&self, peak: f32) -> f32 {
        if peak > SILENCE_PEAK {
            (TARGET_PEAK / peak).clamp(MIN_GAIN, MAX_GAIN)
        } else {
            self.current_gain
        }
    }

    /// Applies adaptive gain to one frame, returning a new frame of the
    /// same length with samples hard-clipped to [-1.0, 1.0].
    pub fn process(&mut self, frame: &[f32]) -> Vec<f32> {
        let peak = frame.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));

        let target = self.target_gain(peak);
        self.current_gain += (target - self.current_gain) * GAIN_SMOOTHING;

        frame
            .iter()
            .map(|s| (s * self.current_gain).clamp(-1.0, 1.0))
            .collect()
    }
}

impl Default for GainNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_gain_for_quiet_frame() {
        let normalizer = GainNormalizer::new();
        // Peak 0.35 → target 0.7 / 0.35 = 2.0, inside [0.25, 4.0]
        let target = normalizer.target_gain(0.35);
        assert!((target - 2.0).abs() < 1e-6, "expected 2.0, got {}", target);
    }

    #[test]
    fn test_target_gain_clamped_high() {
        let normalizer = GainNormalizer::new();
        // Peak 0.05 → raw target 14.0, clamped to 4.0
        assert!((normalizer.target_gain(0.05) - MAX_GAIN).abs() < 1e-6);
    }

    #[test]
    fn test_target_gain_clamped_low() {
        let normalizer = GainNormalizer::new();
        // Peak well above target → raw gain below the floor, clamped to 0.25
        assert!((normalizer.target_gain(5.0) - MIN_GAIN).abs() < 1e-6);
    }

    #[test]
    fn test_silent_frame_leaves_gain_unchanged() {
        let mut normalizer = GainNormalizer::new();
        let before = normalizer.current_gain();
        let frame = vec![0.005f32; 128];
        normalizer.process(&frame);
        assert!((normalizer.current_gain() - before).abs() < 1e-9);
    }

    #[test]
    fn test_gain_moves_toward_target_smoothly() {
        let mut normalizer = GainNormalizer::new();
        let frame = vec![0.35f32; 128];
        normalizer.process(&frame);
        // One step: 1.0 + (2.0 - 1.0) * 0.02 = 1.02
        assert!((normalizer.current_gain() - 1.02).abs() < 1e-6);
    }

    #[test]
    fn test_gain_converges_over_many_frames() {
        let mut normalizer = GainNormalizer::new();
        let frame = vec![0.35f32; 64];
        for _ in 0..1000 {
            normalizer.process(&frame);
        }
        assert!(
            (normalizer.current_gain() - 2.0).abs() < 0.05,
            "gain should converge near 2.0, got {}",
            normalizer.current_gain()
        );
    }

    #[test]
    fn test_output_is_hard_clipped() {
        let mut normalizer = GainNormalizer::new();
        // Push the gain up first with quiet frames
        let quiet = vec![0.2f32; 64];
        for _ in 0..2000 {
            normalizer.process(&quiet);
        }
        // A sudden loud frame must still produce samples within range
        let loud = vec![0.9f32, -0.9, 0.95, -0.95];
        let out = normalizer.process(&loud);
        assert_eq!(out.len(), loud.len());
        for s in out {
            assert!((-1.0..=1.0).contains(&s), "sample {} out of range", s);
        }
    }

    #[test]
    fn test_output_length_matches_input() {
        let mut normalizer = GainNormalizer::new();
        let frame = vec![0.1f32; 333];
        assert_eq!(normalizer.process(&frame).len(), 333);
    }

    #[test]
    fn test_reset_restores_unity_gain() {
        let mut normalizer = GainNormalizer::new();
        let frame = vec![0.35f32; 64];
        for _ in 0..100 {
            normalizer.process(&frame);
        }
        assert!(normalizer.current_gain() > 1.0);
        normalizer.reset();
        assert!((normalizer.current_gain() - 1.0).abs() < f32::EPSILON);
    }
}
