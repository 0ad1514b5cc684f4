//! Transcript reconciliation, storage, canonical rewrites, and export.

pub mod canonical;
pub mod export;
pub mod history;
pub mod reconciler;

pub use canonical::{canonical_form, normalize_word};
pub use export::{ExportStats, export_filename, format_duration, render_transcript};
pub use history::{TranscriptHistory, TranscriptWord};
pub use reconciler::{TranscriptReconciler, WordBatch, format_speaker_label};
