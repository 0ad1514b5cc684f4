//! Session orchestration: the controller event loop and the capture thread.

pub mod capture;
pub mod controller;

pub use capture::{CaptureEvent, spawn_capture};
pub use controller::{SessionController, SessionCounters, SessionEvent};
