//! Markdown export of the full session transcript.

use crate::transcript::history::TranscriptWord;
use chrono::{DateTime, Local};

/// Session counters rendered into the export header.
#[derive(Debug, Clone, Copy)]
pub struct ExportStats {
    pub session_secs: u64,
    pub word_count: usize,
    pub mention_count: usize,
}

/// Formats a duration as HH:MM:SS with zero padding.
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Suggested export filename: transcript-session-<timestamp>.txt with
/// colons and dots replaced so it is safe on every filesystem.
pub fn export_filename(exported_at: DateTime<Local>) -> String {
    let stamp = exported_at
        .to_rfc3339()
        .replace([':', '.'], "-");
    format!("transcript-session-{}.txt", stamp)
}

/// Renders the transcript as a Markdown document.
///
/// Consecutive words by the same speaker are merged into one paragraph;
/// a speaker change starts a new one.
pub fn render_transcript(
    words: &[TranscriptWord],
    stats: ExportStats,
    exported_at: DateTime<Local>,
) -> String {
    let mut out = String::from("# Session Transcript\n\n");
    out.push_str("## Metadata\n");
    out.push_str(&format!(
        "- **Exported On:** {}\n",
        exported_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!(
        "- **Session Duration:** {}\n",
        format_duration(stats.session_secs)
    ));
    out.push_str(&format!("- **Total Words:** {}\n", stats.word_count));
    out.push_str(&format!("- **Total Mentions:** {}\n\n", stats.mention_count));
    out.push_str("---\n\n");
    out.push_str("## Conversation\n\n");

    if let Some(first) = words.first() {
        let mut current_speaker = first.speaker.as_str();
        let mut segment = String::new();

        for entry in words {
            if entry.speaker != current_speaker && !segment.trim().is_empty() {
                out.push_str(&format!("**{}:** {}\n\n", current_speaker, segment.trim()));
                current_speaker = entry.speaker.as_str();
                segment.clear();
            }
            segment.push_str(&entry.word);
            segment.push(' ');
        }

        if !segment.trim().is_empty() {
            out.push_str(&format!("**{}:** {}\n", current_speaker, segment.trim()));
        }
    }

    out.push_str("\n---\n\n# End of Transcript");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn word(text: &str, speaker: &str) -> TranscriptWord {
        TranscriptWord {
            id: 0,
            word: text.to_string(),
            speaker: speaker.to_string(),
            time: "10:00:00".to_string(),
            is_alert: false,
        }
    }

    fn stats() -> ExportStats {
        ExportStats {
            session_secs: 3725,
            word_count: 4,
            mention_count: 2,
        }
    }

    fn exported_at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 25, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_format_duration_pads_fields() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(61), "00:01:01");
        assert_eq!(format_duration(3725), "01:02:05");
    }

    #[test]
    fn test_header_contains_counters() {
        let doc = render_transcript(&[], stats(), exported_at());
        assert!(doc.starts_with("# Session Transcript\n"));
        assert!(doc.contains("- **Session Duration:** 01:02:05\n"));
        assert!(doc.contains("- **Total Words:** 4\n"));
        assert!(doc.contains("- **Total Mentions:** 2\n"));
        assert!(doc.ends_with("# End of Transcript"));
    }

    #[test]
    fn test_words_grouped_by_speaker() {
        let words = vec![
            word("good", "Speaker 1"),
            word("morning", "Speaker 1"),
            word("thanks", "Speaker 2"),
            word("everyone", "Speaker 2"),
        ];
        let doc = render_transcript(&words, stats(), exported_at());
        assert!(doc.contains("**Speaker 1:** good morning\n\n"));
        assert!(doc.contains("**Speaker 2:** thanks everyone\n"));
    }

    #[test]
    fn test_speaker_returning_starts_new_paragraph() {
        let words = vec![
            word("hello", "A"),
            word("hi", "B"),
            word("again", "A"),
        ];
        let doc = render_transcript(&words, stats(), exported_at());
        let a_count = doc.matches("**A:**").count();
        assert_eq!(a_count, 2);
    }

    #[test]
    fn test_filename_has_no_colons_or_dots_in_stamp() {
        let name = export_filename(exported_at());
        assert!(name.starts_with("transcript-session-"));
        assert!(name.ends_with(".txt"));
        let stamp = &name["transcript-session-".len()..name.len() - ".txt".len()];
        assert!(!stamp.contains(':'));
        assert!(!stamp.contains('.'));
    }
}
