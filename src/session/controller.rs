//! The session controller: single owner of all live monitoring state.
//!
//! One controller instance consumes a `SessionEvent` stream and applies
//! every mutation itself, so no state is shared across tasks. Capture
//! frames, inbound server messages, mention pulse expiries, and the stop
//! signal all arrive through the same channel.

use crate::audio::gain::GainNormalizer;
use crate::audio::playback::PlaybackQueue;
use crate::audio::scheduler::AdaptiveBufferScheduler;
use crate::correlation::{self, CorrelationReport};
use crate::defaults::{DETECTION_LOG_LIMIT, MENTION_PULSE_MS};
use crate::error::Result;
use crate::keywords::matcher::{DetectionEvent, KeywordMatcher};
use crate::keywords::parser::KeywordSpec;
use crate::keywords::set::KeywordSet;
use crate::transcript::export::{ExportStats, export_filename, render_transcript};
use crate::transcript::history::TranscriptHistory;
use crate::transcript::reconciler::TranscriptReconciler;
use crate::transcript::{canonical_form, format_speaker_label};
use crate::transport::message::{InboundEvent, OutboundMessage, parse_server_message};
use crate::transport::TranscriptionTransport;
use chrono::Local;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Tool name the service uses to flag word variants.
const IDENTIFY_WORDS_TOOL: &str = "identify_the_words";

/// Everything the controller reacts to.
#[derive(Debug)]
pub enum SessionEvent {
    /// One captured audio frame.
    Frame(Vec<f32>),
    /// One raw server message.
    Inbound(serde_json::Value),
    /// The mention pulse for these keywords expired.
    ClearMention(Vec<String>),
    /// Stop the session.
    Stop,
}

/// Snapshot of the session counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionCounters {
    pub session_secs: f64,
    pub word_count: usize,
    pub mention_count: usize,
}

pub struct SessionController {
    transport: Arc<dyn TranscriptionTransport>,
    events: mpsc::Sender<SessionEvent>,
    capture_stop: Arc<AtomicBool>,

    gain: GainNormalizer,
    scheduler: AdaptiveBufferScheduler,
    reconciler: TranscriptReconciler,
    history: TranscriptHistory,
    keywords: KeywordSet,
    matcher: KeywordMatcher,
    playback: PlaybackQueue,

    detections: VecDeque<DetectionEvent>,
    chart_detections: Vec<DetectionEvent>,
    mention_count: usize,
    current_speaker: String,

    voice_replies: bool,
    started_at: Instant,
    closed: bool,
}

impl SessionController {
    pub fn new(
        transport: Arc<dyn TranscriptionTransport>,
        events: mpsc::Sender<SessionEvent>,
        voice_replies: bool,
    ) -> Self {
        Self {
            transport,
            events,
            capture_stop: Arc::new(AtomicBool::new(false)),
            gain: GainNormalizer::new(),
            scheduler: AdaptiveBufferScheduler::new(),
            reconciler: TranscriptReconciler::new(),
            history: TranscriptHistory::new(),
            keywords: KeywordSet::new(),
            matcher: KeywordMatcher::new(),
            playback: PlaybackQueue::new(),
            detections: VecDeque::new(),
            chart_detections: Vec::new(),
            mention_count: 0,
            current_speaker: "Not Connected".to_string(),
            voice_replies,
            started_at: Instant::now(),
            closed: false,
        }
    }

    /// Flag the capture thread polls to know when to stop.
    pub fn capture_stop_flag(&self) -> Arc<AtomicBool> {
        self.capture_stop.clone()
    }

    /// Consumes events until the channel closes or a stop is handled.
    /// Returns the controller so the caller can export afterwards.
    pub async fn run(mut self, mut rx: mpsc::Receiver<SessionEvent>) -> Self {
        while let Some(event) = rx.recv().await {
            let is_stop = matches!(event, SessionEvent::Stop);
            self.handle_event(event).await;
            if is_stop {
                break;
            }
        }
        self
    }

    pub async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Frame(frame) => self.handle_frame(frame).await,
            SessionEvent::Inbound(message) => self.handle_inbound(&message).await,
            SessionEvent::ClearMention(names) => self.handle_clear_mention(&names),
            SessionEvent::Stop => self.stop().await,
        }
    }

    async fn handle_frame(&mut self, frame: Vec<f32>) {
        if self.closed {
            return;
        }

        let adjusted = self.gain.process(&frame);
        if let Some(chunk) = self.scheduler.push_frame(adjusted) {
            // Frames produced before the transport is ready are dropped,
            // never queued
            if !self.transport.is_ready() {
                return;
            }
            if let Err(e) = self
                .transport
                .send(OutboundMessage::RealtimeAudio { media: chunk })
                .await
            {
                eprintln!("wordwatch: failed to send audio chunk: {}", e);
                if e.is_fatal_to_session() {
                    self.stop().await;
                }
            }
        }
    }

    async fn handle_inbound(&mut self, message: &serde_json::Value) {
        if self.closed {
            return;
        }

        self.scheduler.note_message_arrival(Instant::now());

        for event in parse_server_message(message) {
            // A fatal send error mid-message closes the session; the rest
            // of the message is dropped
            if self.closed {
                break;
            }
            match event {
                InboundEvent::AudioReply { data } => self.handle_audio_reply(&data),
                InboundEvent::Transcription {
                    text,
                    speaker_label,
                } => self.handle_transcription(&text, speaker_label.as_deref()),
                InboundEvent::ToolCall { id, name, word } => {
                    self.handle_tool_call(&id, &name, word.as_deref()).await;
                }
                InboundEvent::TurnComplete => self.reconciler.reset(),
            }
        }
    }

    fn handle_audio_reply(&mut self, data: &str) {
        if !self.voice_replies {
            return;
        }
        let now = self.session_secs();
        self.playback.prune_finished(now);
        if let Err(e) = self.playback.enqueue(data, now) {
            // A bad clip must not take down the session
            eprintln!("wordwatch: dropping audio reply: {}", e);
        }
    }

    fn handle_transcription(&mut self, text: &str, speaker_label: Option<&str>) {
        if let Some(label) = speaker_label {
            self.current_speaker = format_speaker_label(label);
        }

        let Some(mut batch) = self.reconciler.reconcile(text, speaker_label) else {
            return;
        };
        // Updates without a segment label keep the last-known speaker
        batch.speaker = self.current_speaker.clone();

        let time = Local::now().format("%H:%M:%S").to_string();
        let session_secs = self.session_secs();
        let outcome = self.matcher.scan(&batch, &self.keywords, &time, session_secs);

        let words: Vec<(String, bool)> = batch
            .words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), outcome.alert_indices.contains(&i)))
            .collect();
        self.history
            .apply_batch(batch.words_to_remove, words, &batch.speaker, &time);

        if !outcome.detections.is_empty() {
            self.mention_count += outcome.detections.len();
            for detection in &outcome.detections {
                self.detections.push_back(detection.clone());
            }
            while self.detections.len() > DETECTION_LOG_LIMIT {
                self.detections.pop_front();
            }
            self.chart_detections.extend(outcome.detections);
        }

        for (name, count) in &outcome.count_updates {
            let reached = outcome.reached_target.iter().any(|n| n == name);
            self.keywords.apply_count(name, *count, reached);
        }

        if !outcome.reached_target.is_empty() {
            let events = self.events.clone();
            let names = outcome.reached_target.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(MENTION_PULSE_MS)).await;
                let _ = events.send(SessionEvent::ClearMention(names)).await;
            });
        }
    }

    async fn handle_tool_call(&mut self, id: &str, name: &str, word: Option<&str>) {
        if name != IDENTIFY_WORDS_TOOL {
            return;
        }

        let variant = word.map(|w| w.to_lowercase()).unwrap_or_default();
        if let Some(canonical) = canonical_form(&variant) {
            self.history.replace_most_recent(&variant, canonical);
        }

        // Acknowledged even when the variant is unknown, so the service
        // never re-asks
        if let Err(e) = self
            .transport
            .send(OutboundMessage::tool_ack(id, name, &variant))
            .await
        {
            eprintln!("wordwatch: failed to acknowledge tool call: {}", e);
            if e.is_fatal_to_session() {
                self.stop().await;
            }
        }
    }

    fn handle_clear_mention(&mut self, names: &[String]) {
        if self.closed {
            return;
        }
        self.keywords.clear_mentioned(names);
    }

    /// Stops the session: playback first, then the transport, then the
    /// capture thread. Safe to call any number of times.
    pub async fn stop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        self.playback.stop_all();
        if let Err(e) = self.transport.close().await {
            eprintln!("wordwatch: error closing transport: {}", e);
        }
        self.capture_stop.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // ── Keyword management ──────────────────────────────────────────────

    pub fn set_keywords(&mut self, specs: Vec<KeywordSpec>) {
        self.keywords.replace_from_specs(specs);
    }

    pub fn add_keyword(&mut self, spec: KeywordSpec) -> Result<()> {
        self.keywords.add(spec)
    }

    pub fn edit_keyword(&mut self, original_name: &str, spec: KeywordSpec) -> Result<()> {
        self.keywords.edit(original_name, spec)
    }

    pub fn delete_keyword(&mut self, name: &str) -> Result<()> {
        self.keywords.delete(name)
    }

    pub fn set_keyword_aliases(&mut self, name: &str, aliases: Vec<String>) -> Result<()> {
        self.keywords.set_aliases(name, aliases)
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    // ── Views ───────────────────────────────────────────────────────────

    pub fn history(&self) -> &TranscriptHistory {
        &self.history
    }

    /// The bounded live detection log, oldest first.
    pub fn detections(&self) -> impl Iterator<Item = &DetectionEvent> {
        self.detections.iter()
    }

    /// The unbounded detection history used for correlation.
    pub fn chart_detections(&self) -> &[DetectionEvent] {
        &self.chart_detections
    }

    pub fn current_speaker(&self) -> &str {
        &self.current_speaker
    }

    pub fn playback(&self) -> &PlaybackQueue {
        &self.playback
    }

    pub fn counters(&self) -> SessionCounters {
        SessionCounters {
            session_secs: self.session_secs(),
            word_count: self.history.word_count(),
            mention_count: self.mention_count,
        }
    }

    pub fn correlation_report(&self) -> CorrelationReport {
        correlation::analyze(&self.chart_detections)
    }

    /// Renders the export document and its suggested filename.
    pub fn export_transcript(&self) -> (String, String) {
        let now = Local::now();
        let stats = ExportStats {
            session_secs: self.session_secs() as u64,
            word_count: self.history.word_count(),
            mention_count: self.mention_count,
        };
        (
            export_filename(now),
            render_transcript(self.history.full_log(), stats, now),
        )
    }

    fn session_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
