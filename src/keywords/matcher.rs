//! Keyword detection over fresh transcript word batches.
//!
//! Each batch is scanned once per tracked keyword with a case-insensitive
//! word-boundary pattern covering the keyword and its aliases. Counts run
//! on from the keyword's pre-batch count so a target is crossed exactly
//! once per session.

use crate::keywords::set::KeywordSet;
use crate::transcript::reconciler::WordBatch;
use regex::Regex;
use std::collections::HashSet;

/// One keyword hit.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionEvent {
    pub id: u64,
    pub keyword: String,
    /// The literal text that matched (keyword or alias, original casing).
    pub matched_text: String,
    pub speaker: String,
    /// Wall-clock time, formatted for display.
    pub time: String,
    /// Seconds since session start.
    pub session_secs: f64,
    /// The full transcript text at the moment of detection.
    pub context: String,
}

/// Result of scanning one batch.
#[derive(Debug, Default)]
pub struct MatchOutcome {
    pub detections: Vec<DetectionEvent>,
    /// Indices into the batch's words that were part of a target-reaching
    /// match, for alert highlighting.
    pub alert_indices: HashSet<usize>,
    /// Keywords whose count reached the target exactly in this batch.
    pub reached_target: Vec<String>,
    /// New running counts, keyed by keyword name.
    pub count_updates: Vec<(String, u32)>,
}

/// Stateless scanner except for the detection id counter.
#[derive(Debug, Default)]
pub struct KeywordMatcher {
    next_detection_id: u64,
}

struct WordSpan {
    start: usize,
    end: usize,
}

impl KeywordMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans a reconciled batch against every tracked keyword.
    pub fn scan(
        &mut self,
        batch: &WordBatch,
        keywords: &KeywordSet,
        time: &str,
        session_secs: f64,
    ) -> MatchOutcome {
        let mut outcome = MatchOutcome::default();
        if batch.words.is_empty() || keywords.is_empty() {
            return outcome;
        }

        let chunk = batch.words.join(" ");
        let word_spans = word_spans(&batch.words);

        for kw in keywords.iter() {
            let terms: Vec<String> = std::iter::once(kw.name.as_str())
                .chain(kw.aliases.iter().map(|a| a.as_str()))
                .filter(|t| !t.is_empty())
                .map(|t| format!(r"\b{}\b", regex::escape(&t.to_lowercase())))
                .collect();
            if terms.is_empty() {
                continue;
            }

            let Ok(pattern) = Regex::new(&format!("(?i)({})", terms.join("|"))) else {
                continue;
            };

            let matches: Vec<_> = pattern.find_iter(&chunk).collect();
            if matches.is_empty() {
                continue;
            }

            let mut running_count = kw.count;
            outcome
                .count_updates
                .push((kw.name.clone(), kw.count + matches.len() as u32));

            for m in &matches {
                running_count += 1;

                outcome.detections.push(DetectionEvent {
                    id: self.next_detection_id,
                    keyword: kw.name.clone(),
                    matched_text: m.as_str().to_string(),
                    speaker: batch.speaker.clone(),
                    time: time.to_string(),
                    session_secs,
                    context: batch.full_text.clone(),
                });
                self.next_detection_id += 1;

                if running_count == kw.target {
                    outcome.reached_target.push(kw.name.clone());
                    for (index, span) in word_spans.iter().enumerate() {
                        if m.start() < span.end && m.end() > span.start {
                            outcome.alert_indices.insert(index);
                        }
                    }
                }
            }
        }

        outcome
    }
}

/// Byte spans of each word inside the space-joined chunk.
fn word_spans(words: &[String]) -> Vec<WordSpan> {
    let mut spans = Vec::with_capacity(words.len());
    let mut cursor = 0;
    for word in words {
        let start = cursor;
        let end = start + word.len();
        spans.push(WordSpan { start, end });
        cursor = end + 1; // the joining space
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::parser::KeywordSpec;

    fn batch(words: &[&str]) -> WordBatch {
        WordBatch {
            words_to_remove: 0,
            words: words.iter().map(|w| w.to_string()).collect(),
            speaker: "Speaker 1".to_string(),
            full_text: words.join(" "),
        }
    }

    fn set_with(specs: &[(&str, u32)]) -> KeywordSet {
        let mut set = KeywordSet::new();
        for (name, target) in specs {
            set.add(KeywordSpec {
                name: name.to_string(),
                target: *target,
            })
            .unwrap();
        }
        set
    }

    #[test]
    fn test_no_keywords_yields_empty_outcome() {
        let mut matcher = KeywordMatcher::new();
        let outcome = matcher.scan(&batch(&["hello"]), &KeywordSet::new(), "t", 0.0);
        assert!(outcome.detections.is_empty());
    }

    #[test]
    fn test_case_insensitive_whole_word_match() {
        let mut matcher = KeywordMatcher::new();
        let set = set_with(&[("tariffs", 2)]);
        let outcome = matcher.scan(&batch(&["New", "TARIFFS", "announced"]), &set, "t", 1.0);

        assert_eq!(outcome.detections.len(), 1);
        assert_eq!(outcome.detections[0].keyword, "tariffs");
        assert_eq!(outcome.detections[0].matched_text, "TARIFFS");
        assert_eq!(outcome.count_updates, vec![("tariffs".to_string(), 1)]);
    }

    #[test]
    fn test_substring_does_not_match() {
        let mut matcher = KeywordMatcher::new();
        let set = set_with(&[("AI", 1)]);
        let outcome = matcher.scan(&batch(&["daily", "maid", "said"]), &set, "t", 0.0);
        assert!(outcome.detections.is_empty(), "AI must not match inside words");
    }

    #[test]
    fn test_multiple_hits_in_one_batch() {
        let mut matcher = KeywordMatcher::new();
        let set = set_with(&[("AI", 3)]);
        let outcome = matcher.scan(&batch(&["AI", "is", "great", "AI", "AI"]), &set, "t", 0.0);

        assert_eq!(outcome.detections.len(), 3);
        assert_eq!(outcome.count_updates, vec![("AI".to_string(), 3)]);
        // Third hit crosses the target of 3
        assert_eq!(outcome.reached_target, vec!["AI".to_string()]);
        assert!(outcome.alert_indices.contains(&4));
    }

    #[test]
    fn test_target_crossed_exactly_once_across_batches() {
        let mut matcher = KeywordMatcher::new();
        let mut set = set_with(&[("AI", 2)]);

        let first = matcher.scan(&batch(&["AI", "here"]), &set, "t", 0.0);
        assert!(first.reached_target.is_empty());
        for (name, count) in &first.count_updates {
            set.apply_count(name, *count, false);
        }

        let second = matcher.scan(&batch(&["more", "AI", "talk", "AI"]), &set, "t", 1.0);
        // Count goes 1 -> 2 (target) -> 3; only the crossing hit alerts
        assert_eq!(second.reached_target, vec!["AI".to_string()]);
        assert_eq!(second.count_updates, vec![("AI".to_string(), 3)]);
        assert!(second.alert_indices.contains(&1));
        assert!(!second.alert_indices.contains(&3));
    }

    #[test]
    fn test_count_already_past_target_never_alerts_again() {
        let mut matcher = KeywordMatcher::new();
        let mut set = set_with(&[("AI", 1)]);
        set.apply_count("AI", 5, false);

        let outcome = matcher.scan(&batch(&["AI"]), &set, "t", 0.0);
        assert_eq!(outcome.detections.len(), 1);
        assert!(outcome.reached_target.is_empty());
    }

    #[test]
    fn test_aliases_count_toward_the_same_keyword() {
        let mut matcher = KeywordMatcher::new();
        let mut set = set_with(&[("FED", 2)]);
        set.set_aliases("FED", vec!["federal reserve".to_string()])
            .unwrap();

        let outcome = matcher.scan(
            &batch(&["the", "Federal", "Reserve", "and", "the", "FED"]),
            &set,
            "t",
            0.0,
        );

        assert_eq!(outcome.detections.len(), 2);
        assert_eq!(outcome.detections[0].matched_text, "Federal Reserve");
        assert_eq!(outcome.reached_target, vec!["FED".to_string()]);
    }

    #[test]
    fn test_regex_metacharacters_in_keyword_are_literal() {
        let mut matcher = KeywordMatcher::new();
        let set = set_with(&[("covid-19", 1)]);
        let outcome = matcher.scan(&batch(&["new", "covid-19", "cases"]), &set, "t", 0.0);
        assert_eq!(outcome.detections.len(), 1);

        // A keyword ending in metacharacters compiles without panicking
        let set = set_with(&[("C++", 1)]);
        let _ = matcher.scan(&batch(&["C++", "code"]), &set, "t", 0.0);
    }

    #[test]
    fn test_detection_context_is_full_transcript_text() {
        let mut matcher = KeywordMatcher::new();
        let set = set_with(&[("AI", 1)]);
        let mut b = batch(&["AI"]);
        b.full_text = "the whole running transcript with AI".to_string();
        let outcome = matcher.scan(&b, &set, "t", 2.5);
        assert_eq!(
            outcome.detections[0].context,
            "the whole running transcript with AI"
        );
        assert!((outcome.detections[0].session_secs - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_detection_ids_are_monotonic() {
        let mut matcher = KeywordMatcher::new();
        let set = set_with(&[("AI", 5)]);
        matcher.scan(&batch(&["AI"]), &set, "t", 0.0);
        let outcome = matcher.scan(&batch(&["AI", "AI"]), &set, "t", 1.0);
        let ids: Vec<u64> = outcome.detections.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
