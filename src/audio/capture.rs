//! Audio capture sources.
//!
//! Defines the `AudioSource` seam polled by the session's capture thread,
//! a mock source for tests, and (behind the `cpal-audio` feature) a live
//! microphone source that downmixes to mono at 16kHz.

use crate::error::Result;

/// Source of captured audio frames (f32 samples in [-1.0, 1.0], mono).
///
/// This trait allows swapping implementations (live microphone, WAV replay,
/// mocks for tests).
pub trait AudioSource: Send {
    /// Start capturing audio.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio. Must be idempotent.
    fn stop(&mut self) -> Result<()>;

    /// Whether this source ends on its own (file/pipe) or runs until stopped.
    fn is_finite(&self) -> bool;

    /// Read the samples captured since the last call.
    ///
    /// An empty frame from a live source means nothing arrived yet; an empty
    /// frame from a finite source means it is exhausted.
    fn read_frame(&mut self) -> Result<Vec<f32>>;
}

/// A phase of frames for the mock source.
#[derive(Debug, Clone)]
pub struct FramePhase {
    pub samples: Vec<f32>,
    pub count: usize,
}

/// Mock audio source for testing.
pub struct MockAudioSource {
    phases: Vec<FramePhase>,
    phase_index: usize,
    emitted_in_phase: usize,
    started: bool,
    stopped: bool,
    finite: bool,
    fail_on_start: Option<String>,
}

impl MockAudioSource {
    /// Creates a mock source with no frames.
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            phase_index: 0,
            emitted_in_phase: 0,
            started: false,
            stopped: false,
            finite: true,
            fail_on_start: None,
        }
    }

    /// Configures the sequence of frame phases to emit.
    pub fn with_frame_sequence(mut self, phases: Vec<FramePhase>) -> Self {
        self.phases = phases;
        self
    }

    /// Marks the source as live (never exhausts on empty reads).
    pub fn as_live_source(mut self) -> Self {
        self.finite = false;
        self
    }

    /// Configures start() to fail with a permission error.
    pub fn with_permission_failure(mut self, source_type: &str) -> Self {
        self.fail_on_start = Some(source_type.to_string());
        self
    }

    /// Whether stop() has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if let Some(source_type) = &self.fail_on_start {
            return Err(crate::error::WordwatchError::CapturePermissionDenied {
                source_type: source_type.clone(),
            });
        }
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.stopped = true;
        Ok(())
    }

    fn is_finite(&self) -> bool {
        self.finite
    }

    fn read_frame(&mut self) -> Result<Vec<f32>> {
        while self.phase_index < self.phases.len() {
            let phase = &self.phases[self.phase_index];
            if self.emitted_in_phase < phase.count {
                self.emitted_in_phase += 1;
                return Ok(phase.samples.clone());
            }
            self.phase_index += 1;
            self.emitted_in_phase = 0;
        }
        Ok(Vec::new())
    }
}

#[cfg(feature = "cpal-audio")]
pub use live::{CpalAudioSource, list_devices};

#[cfg(feature = "cpal-audio")]
mod live {
    use super::AudioSource;
    use crate::defaults::SAMPLE_RATE;
    use crate::error::{Result, WordwatchError};
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use std::sync::{Arc, Mutex};

    /// List available audio input device names.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| WordwatchError::AudioCapture {
                message: format!("Failed to enumerate input devices: {}", e),
            })?;
        Ok(devices.filter_map(|d| d.name().ok()).collect())
    }

    /// Live microphone source backed by a CPAL input stream.
    ///
    /// The stream callback downmixes to mono and appends into a shared
    /// buffer drained by `read_frame`.
    pub struct CpalAudioSource {
        device_name: Option<String>,
        stream: Option<cpal::Stream>,
        buffer: Arc<Mutex<Vec<f32>>>,
    }

    // SAFETY: the cpal::Stream is only created and dropped on the owning
    // thread; the sample buffer is the only state shared with the callback.
    unsafe impl Send for CpalAudioSource {}

    impl CpalAudioSource {
        /// Creates a source for the named device, or the default input.
        pub fn new(device_name: Option<String>) -> Self {
            Self {
                device_name,
                stream: None,
                buffer: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn find_device(&self) -> Result<cpal::Device> {
            let host = cpal::default_host();
            match &self.device_name {
                Some(name) => host
                    .input_devices()
                    .map_err(|e| WordwatchError::AudioCapture {
                        message: format!("Failed to enumerate input devices: {}", e),
                    })?
                    .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
                    .ok_or_else(|| WordwatchError::AudioDeviceNotFound {
                        device: name.clone(),
                    }),
                None => host
                    .default_input_device()
                    .ok_or_else(|| WordwatchError::AudioDeviceNotFound {
                        device: "default".to_string(),
                    }),
            }
        }
    }

    impl AudioSource for CpalAudioSource {
        fn start(&mut self) -> Result<()> {
            let device = self.find_device()?;
            let config = device
                .default_input_config()
                .map_err(|e| WordwatchError::CapturePermissionDenied {
                    source_type: format!("microphone ({})", e),
                })?;

            let channels = config.channels() as usize;
            let source_rate = config.sample_rate().0;
            let buffer = self.buffer.clone();

            let stream = device
                .build_input_stream(
                    &config.into(),
                    move |data: &[f32], _| {
                        let mut buf = match buffer.lock() {
                            Ok(guard) => guard,
                            Err(_) => return,
                        };
                        if channels <= 1 && source_rate == SAMPLE_RATE {
                            buf.extend_from_slice(data);
                            return;
                        }
                        // Downmix interleaved channels to mono, then decimate
                        // toward 16kHz with a nearest-sample step.
                        let step = (source_rate as f64 / SAMPLE_RATE as f64).max(1.0);
                        let frames = data.len() / channels.max(1);
                        let mut cursor = 0.0f64;
                        while (cursor as usize) < frames {
                            let frame = cursor as usize;
                            let mut acc = 0.0f32;
                            for ch in 0..channels {
                                acc += data[frame * channels + ch];
                            }
                            buf.push(acc / channels as f32);
                            cursor += step;
                        }
                    },
                    |err| eprintln!("wordwatch: audio stream error: {}", err),
                    None,
                )
                .map_err(|e| WordwatchError::AudioCapture {
                    message: format!("Failed to build input stream: {}", e),
                })?;

            stream.play().map_err(|e| WordwatchError::AudioCapture {
                message: format!("Failed to start input stream: {}", e),
            })?;

            self.stream = Some(stream);
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            // Dropping the stream stops capture; already-stopped is a no-op.
            self.stream = None;
            Ok(())
        }

        fn is_finite(&self) -> bool {
            false
        }

        fn read_frame(&mut self) -> Result<Vec<f32>> {
            let mut buf = self.buffer.lock().map_err(|_| WordwatchError::AudioCapture {
                message: "capture buffer lock poisoned".to_string(),
            })?;
            Ok(std::mem::take(&mut *buf))
        }
    }
}
