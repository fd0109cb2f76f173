use chrono::{DateTime, NaiveDate};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fmt::TimeLabeler;

use super::library::ShapeLibrary;
use super::shape::ShapePoint;

/// A detected pattern for one day, as reported by the upstream classifier.
/// Field names mirror the classifier's snake_case JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternDetection {
    pub pattern_id: String,
    #[serde(default)]
    pub metrics: serde_json::Map<String, Value>,
    #[serde(default)]
    pub evidence: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPoint {
    pub timestamp_ms: i64,
    pub minute_of_day: u32,
    pub median: f64,
    pub label: String,
}

/// A pattern curve positioned on one day's absolute timeline. Constructed
/// fresh per (day, detections) pair; never mutated afterwards.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatternOverlay {
    pub pattern_id: String,
    pub label: String,
    pub points: Vec<OverlayPoint>,
    pub occurrences: f64,
    pub highlight: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

const COUNT_KEY_HINTS: [&str; 5] = ["day", "night", "occurrence", "count", "episode"];
const EVIDENCE_LIST_KEYS: [&str; 3] = ["examples", "persistent_examples", "spike_examples"];
const HIGHLIGHT_COLOR: &str = "#ef4444";

/// Occurrence count for a detection.
///
/// Takes the maximum numeric metric whose key contains (case-insensitively)
/// one of "day", "night", "occurrence", "count", or "episode". When no such
/// metric exists, falls back to the longest known evidence example list,
/// then to 1: presence without quantification still counts as one
/// occurrence.
pub fn occurrence_count(detection: &PatternDetection) -> f64 {
    let mut count: f64 = 0.0;
    for (key, value) in &detection.metrics {
        let Some(number) = value.as_f64() else { continue };
        let key = key.to_lowercase();
        if COUNT_KEY_HINTS.iter().any(|hint| key.contains(hint)) {
            count = count.max(number);
        }
    }

    if count == 0.0 {
        for key in EVIDENCE_LIST_KEYS {
            if let Some(Value::Array(items)) = detection.evidence.get(key) {
                if !items.is_empty() {
                    count = count.max(items.len() as f64);
                }
            }
        }
    }

    if count == 0.0 {
        1.0
    } else {
        count
    }
}

/// "nocturnal_hypoglycemia_severe" -> "Nocturnal Hypoglycemia Severe".
pub fn pattern_label(pattern_id: &str) -> String {
    pattern_id
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn day_start_ms(day: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

/// Build one overlay from a detection and its (optional) shape template.
///
/// Template samples map onto the day via `day_start + minute * 60000`;
/// labels come from the viewer's locale. A detection whose pattern has no
/// template, or an empty template, yields an overlay with no points and no
/// highlight; the occurrence count is reported either way.
pub fn build_overlay(
    day_start_ms: i64,
    detection: &PatternDetection,
    template: Option<&[ShapePoint]>,
    labeler: &TimeLabeler,
) -> PatternOverlay {
    let occurrences = occurrence_count(detection);

    let mut points = Vec::new();
    let mut highlight = false;
    if let Some(template) = template {
        if !template.is_empty() {
            highlight = occurrences > 0.0;
            points = template
                .iter()
                .map(|sample| {
                    let timestamp_ms = day_start_ms + i64::from(sample.minute_of_day) * 60_000;
                    let label = DateTime::from_timestamp_millis(timestamp_ms)
                        .map(|timestamp| labeler.label(timestamp))
                        .unwrap_or_default();
                    OverlayPoint {
                        timestamp_ms,
                        minute_of_day: sample.minute_of_day,
                        median: sample.median,
                        label,
                    }
                })
                .collect();
        }
    }

    PatternOverlay {
        pattern_id: detection.pattern_id.clone(),
        label: pattern_label(&detection.pattern_id),
        points,
        occurrences,
        highlight,
        color: highlight.then(|| HIGHLIGHT_COLOR.to_string()),
    }
}

/// Resolve the overlay set for a day: one overlay per detection, in the
/// detections' order, consulting the shape library for templates.
pub async fn resolve_overlays(
    library: &ShapeLibrary,
    day: &str,
    detections: &[PatternDetection],
    labeler: &TimeLabeler,
) -> Vec<PatternOverlay> {
    if detections.is_empty() {
        return Vec::new();
    }
    let Some(day_start) = day_start_ms(day) else {
        warn!("cannot align pattern overlays onto malformed day key {day:?}");
        return Vec::new();
    };

    let mut overlays = Vec::with_capacity(detections.len());
    for detection in detections {
        let template = library.template(&detection.pattern_id).await;
        let samples = template.as_deref().map(Vec::as_slice);
        overlays.push(build_overlay(day_start, detection, samples, labeler));
    }
    overlays
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detection(value: serde_json::Value) -> PatternDetection {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn count_prefers_matching_metric_keys() {
        let det = detection(json!({
            "pattern_id": "dual_peak",
            "metrics": { "day_count": 3, "other": 9 }
        }));
        assert_eq!(occurrence_count(&det), 3.0);
    }

    #[test]
    fn count_key_match_is_case_insensitive_substring() {
        let det = detection(json!({
            "pattern_id": "dual_peak",
            "metrics": { "NightEpisodes": 4 }
        }));
        assert_eq!(occurrence_count(&det), 4.0);
    }

    #[test]
    fn non_numeric_metric_values_are_ignored() {
        let det = detection(json!({
            "pattern_id": "dual_peak",
            "metrics": { "day_count": "3", "episode_flag": true }
        }));
        assert_eq!(occurrence_count(&det), 1.0);
    }

    #[test]
    fn falls_back_to_evidence_list_lengths() {
        let det = detection(json!({
            "pattern_id": "frequent_spike",
            "metrics": { "severity": 2.5 },
            "evidence": {
                "examples": ["a"],
                "spike_examples": ["a", "b", "c"]
            }
        }));
        assert_eq!(occurrence_count(&det), 3.0);
    }

    #[test]
    fn defaults_to_one_occurrence() {
        let det = detection(json!({ "pattern_id": "somogyi_effect" }));
        assert_eq!(occurrence_count(&det), 1.0);
    }

    #[test]
    fn metric_match_beats_evidence_lists() {
        let det = detection(json!({
            "pattern_id": "frequent_spike",
            "metrics": { "spike_count": 2 },
            "evidence": { "spike_examples": ["a", "b", "c", "d"] }
        }));
        assert_eq!(occurrence_count(&det), 2.0);
    }

    #[test]
    fn title_cases_pattern_ids() {
        assert_eq!(pattern_label("dawn_phenomenon"), "Dawn Phenomenon");
        assert_eq!(
            pattern_label("nocturnal_hypoglycemia_severe"),
            "Nocturnal Hypoglycemia Severe"
        );
        assert_eq!(pattern_label("spike"), "Spike");
    }

    #[test]
    fn aligns_template_onto_day_timeline() {
        let det = detection(json!({
            "pattern_id": "dawn_phenomenon",
            "metrics": { "night_count": 2 }
        }));
        let template = vec![
            ShapePoint { minute_of_day: 0, median: 92.0 },
            ShapePoint { minute_of_day: 360, median: 128.0 },
        ];
        let day_start = day_start_ms("2025-11-12").unwrap();

        let overlay = build_overlay(day_start, &det, Some(&template), &TimeLabeler::default());

        assert_eq!(overlay.points.len(), 2);
        assert_eq!(overlay.points[0].timestamp_ms, day_start);
        assert_eq!(overlay.points[1].timestamp_ms, day_start + 360 * 60_000);
        assert_eq!(overlay.points[1].minute_of_day, 360);
        assert_eq!(overlay.points[1].label, "06:00");
        assert_eq!(overlay.label, "Dawn Phenomenon");
        assert!(overlay.highlight);
        assert_eq!(overlay.color.as_deref(), Some("#ef4444"));
        assert_eq!(overlay.occurrences, 2.0);
    }

    #[test]
    fn shapeless_detection_is_never_highlighted() {
        let det = detection(json!({
            "pattern_id": "frequent_spike",
            "metrics": { "spike_count": 5 }
        }));
        let overlay = build_overlay(0, &det, None, &TimeLabeler::default());

        assert!(overlay.points.is_empty());
        assert!(!overlay.highlight);
        assert!(overlay.color.is_none());
        assert_eq!(overlay.occurrences, 5.0);
    }

    #[test]
    fn empty_template_behaves_like_no_shape() {
        let det = detection(json!({
            "pattern_id": "dual_peak",
            "metrics": { "day_count": 3 }
        }));
        let overlay = build_overlay(0, &det, Some(&[]), &TimeLabeler::default());

        assert!(overlay.points.is_empty());
        assert!(!overlay.highlight);
        assert!(overlay.color.is_none());
    }
}
