//! Reconciles cumulative transcription updates into word-level deltas.
//!
//! The transcription transport resends the full running text on every
//! update, often rewriting its own tail as recognition improves. The
//! reconciler diffs each update against the previous one and emits only
//! the retraction count and the fresh words, so downstream consumers
//! never double-count.

/// Delta produced by one reconciliation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBatch {
    /// Trailing words of the prior text superseded by this update.
    pub words_to_remove: usize,
    /// Fresh words starting at the divergence point.
    pub words: Vec<String>,
    /// Display-formatted speaker for this batch.
    pub speaker: String,
    /// The complete new transcript text, kept for detection context.
    pub full_text: String,
}

/// Diffs cumulative transcript updates against the previously seen text.
#[derive(Debug, Default)]
pub struct TranscriptReconciler {
    previous_full_text: String,
}

/// Formats a raw speaker label for display: underscores become spaces and
/// each word is title-cased ("speaker_1" becomes "Speaker 1").
pub fn format_speaker_label(label: &str) -> String {
    let spaced = label.replace('_', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for ch in spaced.chars() {
        if at_word_start && ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            if !ch.is_alphanumeric() {
                at_word_start = true;
            }
            out.push(ch);
        }
    }
    out
}

impl TranscriptReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes one cumulative update.
    ///
    /// Updates that are not strictly longer than the previous text (by
    /// character count) are ignored entirely. A longer update whose word
    /// suffix is empty is a lazy retraction: the baseline advances but no
    /// batch is emitted and nothing is removed downstream.
    pub fn reconcile(&mut self, new_text: &str, speaker_label: Option<&str>) -> Option<WordBatch> {
        if new_text.chars().count() <= self.previous_full_text.chars().count() {
            return None;
        }

        let old_words: Vec<&str> = self.previous_full_text.split_whitespace().collect();
        let new_words: Vec<&str> = new_text.split_whitespace().collect();

        let mut first_diff = 0;
        while first_diff < old_words.len()
            && first_diff < new_words.len()
            && old_words[first_diff] == new_words[first_diff]
        {
            first_diff += 1;
        }

        let words_to_remove = old_words.len() - first_diff;
        let words: Vec<String> = new_words[first_diff..].iter().map(|w| w.to_string()).collect();

        self.previous_full_text = new_text.to_string();

        if words.is_empty() {
            return None;
        }

        let speaker = speaker_label
            .map(format_speaker_label)
            .unwrap_or_else(|| "Unknown".to_string());

        Some(WordBatch {
            words_to_remove,
            words,
            speaker,
            full_text: new_text.to_string(),
        })
    }

    /// Clears the baseline. Called when the transport signals a completed
    /// turn, so the next update diffs against empty text.
    pub fn reset(&mut self) {
        self.previous_full_text.clear();
    }
}
