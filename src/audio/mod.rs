//! Audio capture, conditioning, and scheduling.

pub mod capture;
pub mod gain;
pub mod pcm;
pub mod playback;
pub mod scheduler;
pub mod wav;

pub use capture::{AudioSource, FramePhase, MockAudioSource};
#[cfg(feature = "cpal-audio")]
pub use capture::{CpalAudioSource, list_devices};
pub use gain::GainNormalizer;
pub use playback::PlaybackQueue;
pub use scheduler::{AdaptiveBufferScheduler, EncodedChunk};
pub use wav::WavAudioSource;
