//! Transcript storage: the unbounded session log and the bounded display
//! window, kept in sync through batch application and canonical rewrites.

use crate::defaults::DISPLAY_WINDOW_WORDS;
use crate::transcript::canonical::normalize_word;

/// One committed transcript word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptWord {
    pub id: u64,
    pub word: String,
    pub speaker: String,
    /// Wall-clock time of commit, already formatted for display.
    pub time: String,
    /// Whether this word was part of a target-reaching detection.
    pub is_alert: bool,
}

/// Full session log plus a bounded recent-words window.
///
/// Both views receive every append and retraction; the display window
/// additionally drops its oldest words past the window size.
#[derive(Debug, Default)]
pub struct TranscriptHistory {
    full: Vec<TranscriptWord>,
    display: Vec<TranscriptWord>,
    next_id: u64,
}

impl TranscriptHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes the last `count` words, then appends the batch.
    ///
    /// `words` pairs each word with its alert flag. Retraction past the
    /// start is clamped rather than an error.
    pub fn apply_batch(
        &mut self,
        words_to_remove: usize,
        words: Vec<(String, bool)>,
        speaker: &str,
        time: &str,
    ) {
        let keep_full = self.full.len().saturating_sub(words_to_remove);
        self.full.truncate(keep_full);
        let keep_display = self.display.len().saturating_sub(words_to_remove);
        self.display.truncate(keep_display);

        for (word, is_alert) in words {
            let entry = TranscriptWord {
                id: self.next_id,
                word,
                speaker: speaker.to_string(),
                time: time.to_string(),
                is_alert,
            };
            self.next_id += 1;
            self.full.push(entry.clone());
            self.display.push(entry);
        }

        if self.display.len() > DISPLAY_WINDOW_WORDS {
            let excess = self.display.len() - DISPLAY_WINDOW_WORDS;
            self.display.drain(..excess);
        }
    }

    /// Rewrites the most recent word whose normalized form equals
    /// `variant` to the canonical replacement. The display window and the
    /// full log are searched independently, so a variant that has already
    /// scrolled out of the window is still fixed in the log.
    ///
    /// Returns true if either view changed.
    pub fn replace_most_recent(&mut self, variant: &str, replacement: &str) -> bool {
        let mut changed = false;
        for view in [&mut self.display, &mut self.full] {
            if let Some(entry) = view
                .iter_mut()
                .rev()
                .find(|e| normalize_word(&e.word) == variant)
            {
                entry.word = replacement.to_string();
                changed = true;
            }
        }
        changed
    }

    /// Every word committed this session, oldest first.
    pub fn full_log(&self) -> &[TranscriptWord] {
        &self.full
    }

    /// The bounded recent-words window, oldest first.
    pub fn display_window(&self) -> &[TranscriptWord] {
        &self.display
    }

    /// Total words currently in the session log.
    pub fn word_count(&self) -> usize {
        self.full.len()
    }
}
