//! Capture thread: polls an `AudioSource` and streams frames out over a
//! bounded channel until stopped or the source runs dry.

use crate::audio::capture::AudioSource;
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// What the capture thread emits.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    Frame(Vec<f32>),
    /// The source is exhausted (finite sources only).
    Finished,
}

const IDLE_POLL: Duration = Duration::from_millis(20);

/// Spawns the capture thread. It stops when `stop` is raised, the channel
/// disconnects, or a finite source is exhausted (emitting `Finished`).
///
/// A start failure is reported once on stderr and the thread exits with
/// `Finished` so the session can wind down.
pub fn spawn_capture(
    mut source: Box<dyn AudioSource>,
    frames: Sender<CaptureEvent>,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        if let Err(e) = source.start() {
            eprintln!("wordwatch: failed to start audio capture: {}", e);
            let _ = frames.send(CaptureEvent::Finished);
            return;
        }

        loop {
            if stop.load(Ordering::SeqCst) {
                break;
            }

            let frame = match source.read_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    eprintln!("wordwatch: audio capture error: {}", e);
                    break;
                }
            };

            if frame.is_empty() {
                if source.is_finite() {
                    let _ = frames.send(CaptureEvent::Finished);
                    break;
                }
                thread::sleep(IDLE_POLL);
                continue;
            }

            if frames.send(CaptureEvent::Frame(frame)).is_err() {
                // Receiver dropped, session is gone
                break;
            }
        }

        if let Err(e) = source.stop() {
            eprintln!("wordwatch: error stopping audio capture: {}", e);
        }
    })
}
