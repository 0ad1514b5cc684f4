//! Post-hoc correlation analysis over the session's detection events.
//!
//! Builds per-keyword cumulative step series, finds the dominant keyword,
//! and reports proximity pairs (detections of different keywords close in
//! time) plus tension lines (pairs that co-occur repeatedly).

use crate::defaults::{PROXIMITY_THRESHOLD_SECS, TENSION_LINE_THRESHOLD};
use crate::keywords::matcher::DetectionEvent;
use std::collections::HashMap;

/// One vertex of a cumulative step series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub time: f64,
    pub count: u32,
}

/// An actual detection on the series, carrying its transcript context.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionPoint {
    pub time: f64,
    pub count: u32,
    pub context: String,
}

/// Cumulative mention history for one keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordSeries {
    pub keyword: String,
    /// Step-shaped polyline: starts at (0, 0) and duplicates each
    /// detection time at the old and new count.
    pub step_points: Vec<SeriesPoint>,
    /// One point per detection.
    pub detections: Vec<DetectionPoint>,
}

/// Two detections of different keywords within the proximity threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityPair {
    pub from_keyword: String,
    pub to_keyword: String,
    pub from_time: f64,
    pub to_time: f64,
}

/// A keyword pair with repeated proximity interactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensionLine {
    pub keyword_a: String,
    pub keyword_b: String,
}

/// Full correlation analysis output.
#[derive(Debug, Default)]
pub struct CorrelationReport {
    /// One series per detected keyword, in order of first detection.
    pub series: Vec<KeywordSeries>,
    /// Keyword with the strictly highest final count, if any.
    pub dominant: Option<String>,
    pub proximity_pairs: Vec<ProximityPair>,
    pub tension_lines: Vec<TensionLine>,
    /// Suggested chart axis maximum, rounded up to a multiple of five.
    pub axis_max: u32,
}

/// Analyzes the detection history. The input need not be sorted.
pub fn analyze(detections: &[DetectionEvent]) -> CorrelationReport {
    if detections.is_empty() {
        return CorrelationReport {
            axis_max: 5,
            ..Default::default()
        };
    }

    let mut sorted: Vec<&DetectionEvent> = detections.iter().collect();
    sorted.sort_by(|a, b| {
        a.session_secs
            .partial_cmp(&b.session_secs)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Series in order of first detection
    let mut series: Vec<KeywordSeries> = Vec::new();
    let mut index_of: HashMap<&str, usize> = HashMap::new();

    for detection in &sorted {
        let index = *index_of.entry(detection.keyword.as_str()).or_insert_with(|| {
            series.push(KeywordSeries {
                keyword: detection.keyword.clone(),
                step_points: vec![SeriesPoint { time: 0.0, count: 0 }],
                detections: Vec::new(),
            });
            series.len() - 1
        });

        let entry = &mut series[index];
        let prev_count = entry
            .step_points
            .last()
            .map(|p| p.count)
            .unwrap_or(0);
        let count = prev_count + 1;

        entry.step_points.push(SeriesPoint {
            time: detection.session_secs,
            count: prev_count,
        });
        entry.step_points.push(SeriesPoint {
            time: detection.session_secs,
            count,
        });
        entry.detections.push(DetectionPoint {
            time: detection.session_secs,
            count,
            context: detection.context.clone(),
        });
    }

    // Strict maximum wins; a tie means no dominance
    let mut dominant: Option<String> = None;
    let mut max_mentions = 0u32;
    for entry in &series {
        let count = entry.detections.last().map(|p| p.count).unwrap_or(0);
        if count > max_mentions {
            max_mentions = count;
            dominant = Some(entry.keyword.clone());
        } else if count == max_mentions && count > 0 {
            dominant = None;
        }
    }

    let mut proximity_pairs = Vec::new();
    let mut interaction_counts: HashMap<(String, String), usize> = HashMap::new();

    for pair in sorted.windows(2) {
        let (prev, current) = (pair[0], pair[1]);
        if current.keyword != prev.keyword
            && (current.session_secs - prev.session_secs).abs() <= PROXIMITY_THRESHOLD_SECS
        {
            proximity_pairs.push(ProximityPair {
                from_keyword: prev.keyword.clone(),
                to_keyword: current.keyword.clone(),
                from_time: prev.session_secs,
                to_time: current.session_secs,
            });

            let mut key = [prev.keyword.clone(), current.keyword.clone()];
            key.sort();
            let [a, b] = key;
            *interaction_counts.entry((a, b)).or_insert(0) += 1;
        }
    }

    let mut tension_lines: Vec<TensionLine> = interaction_counts
        .into_iter()
        .filter(|(_, count)| *count >= TENSION_LINE_THRESHOLD)
        .map(|((keyword_a, keyword_b), _)| TensionLine {
            keyword_a,
            keyword_b,
        })
        .collect();
    tension_lines.sort_by(|a, b| (&a.keyword_a, &a.keyword_b).cmp(&(&b.keyword_a, &b.keyword_b)));

    let raw_max = series
        .iter()
        .map(|s| s.detections.last().map(|p| p.count).unwrap_or(0))
        .max()
        .unwrap_or(0);
    let axis_max = std::cmp::max(5, raw_max.div_ceil(5) * 5);

    CorrelationReport {
        series,
        dominant,
        proximity_pairs,
        tension_lines,
        axis_max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(keyword: &str, at: f64) -> DetectionEvent {
        DetectionEvent {
            id: 0,
            keyword: keyword.to_string(),
            matched_text: keyword.to_string(),
            speaker: "Speaker 1".to_string(),
            time: "10:00:00".to_string(),
            session_secs: at,
            context: format!("context at {}", at),
        }
    }

    #[test]
    fn test_empty_input_yields_empty_report() {
        let report = analyze(&[]);
        assert!(report.series.is_empty());
        assert!(report.dominant.is_none());
        assert!(report.proximity_pairs.is_empty());
        assert_eq!(report.axis_max, 5);
    }

    #[test]
    fn test_step_series_duplicates_each_detection_time() {
        let report = analyze(&[detection("AI", 2.0), detection("AI", 7.0)]);
        let series = &report.series[0];
        assert_eq!(
            series.step_points,
            vec![
                SeriesPoint { time: 0.0, count: 0 },
                SeriesPoint { time: 2.0, count: 0 },
                SeriesPoint { time: 2.0, count: 1 },
                SeriesPoint { time: 7.0, count: 1 },
                SeriesPoint { time: 7.0, count: 2 },
            ]
        );
        assert_eq!(series.detections.len(), 2);
    }

    #[test]
    fn test_unsorted_input_is_sorted_by_session_time() {
        let report = analyze(&[detection("AI", 9.0), detection("AI", 1.0)]);
        let series = &report.series[0];
        assert_eq!(series.detections[0].time, 1.0);
        assert_eq!(series.detections[1].time, 9.0);
    }

    #[test]
    fn test_dominant_is_strict_maximum() {
        let report = analyze(&[
            detection("AI", 1.0),
            detection("AI", 20.0),
            detection("FED", 30.0),
        ]);
        assert_eq!(report.dominant.as_deref(), Some("AI"));
    }

    #[test]
    fn test_tie_means_no_dominant() {
        let report = analyze(&[detection("AI", 1.0), detection("FED", 20.0)]);
        assert!(report.dominant.is_none());
    }

    #[test]
    fn test_proximity_pairs_need_different_keywords() {
        let report = analyze(&[
            detection("AI", 10.0),
            detection("AI", 12.0),
            detection("FED", 14.0),
        ]);
        assert_eq!(report.proximity_pairs.len(), 1);
        assert_eq!(report.proximity_pairs[0].from_keyword, "AI");
        assert_eq!(report.proximity_pairs[0].to_keyword, "FED");
    }

    #[test]
    fn test_proximity_respects_threshold() {
        let close = analyze(&[detection("AI", 10.0), detection("FED", 15.0)]);
        assert_eq!(close.proximity_pairs.len(), 1, "5.0s gap is inside");

        let far = analyze(&[detection("AI", 10.0), detection("FED", 15.1)]);
        assert!(far.proximity_pairs.is_empty(), "5.1s gap is outside");
    }

    #[test]
    fn test_only_adjacent_detections_pair() {
        // AI at 0, AI at 1, FED at 3: only (AI@1, FED@3) is adjacent
        let report = analyze(&[
            detection("AI", 0.0),
            detection("AI", 1.0),
            detection("FED", 3.0),
        ]);
        assert_eq!(report.proximity_pairs.len(), 1);
        assert_eq!(report.proximity_pairs[0].from_time, 1.0);
    }

    #[test]
    fn test_tension_line_after_threshold_interactions() {
        let mut events = Vec::new();
        for i in 0..TENSION_LINE_THRESHOLD {
            let base = i as f64 * 60.0;
            events.push(detection("AI", base));
            events.push(detection("FED", base + 2.0));
        }
        let report = analyze(&events);
        assert_eq!(report.tension_lines.len(), 1);
        let line = &report.tension_lines[0];
        assert_eq!((line.keyword_a.as_str(), line.keyword_b.as_str()), ("AI", "FED"));
    }

    #[test]
    fn test_tension_pair_is_direction_agnostic() {
        // Alternate which keyword comes first; both directions accumulate
        let mut events = Vec::new();
        for i in 0..TENSION_LINE_THRESHOLD {
            let base = i as f64 * 60.0;
            if i % 2 == 0 {
                events.push(detection("AI", base));
                events.push(detection("FED", base + 2.0));
            } else {
                events.push(detection("FED", base));
                events.push(detection("AI", base + 2.0));
            }
        }
        let report = analyze(&events);
        assert_eq!(report.tension_lines.len(), 1);
    }

    #[test]
    fn test_below_threshold_has_no_tension_line() {
        let mut events = Vec::new();
        for i in 0..TENSION_LINE_THRESHOLD - 1 {
            let base = i as f64 * 60.0;
            events.push(detection("AI", base));
            events.push(detection("FED", base + 2.0));
        }
        let report = analyze(&events);
        assert!(report.tension_lines.is_empty());
    }

    #[test]
    fn test_axis_max_rounds_up_to_multiple_of_five() {
        let events: Vec<_> = (0..7).map(|i| detection("AI", i as f64 * 10.0)).collect();
        let report = analyze(&events);
        assert_eq!(report.axis_max, 10);
    }

    #[test]
    fn test_series_ordered_by_first_detection() {
        let report = analyze(&[
            detection("FED", 5.0),
            detection("AI", 1.0),
            detection("FED", 9.0),
        ]);
        assert_eq!(report.series[0].keyword, "AI");
        assert_eq!(report.series[1].keyword, "FED");
    }
}
