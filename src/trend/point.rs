use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::fmt::TimeLabeler;

/// A glucose reading exactly as it appears in the exported dataset. A null
/// value means the sensor produced no usable sample at that timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReading {
    pub utc: String,
    pub value: Option<f64>,
}

/// A normalized, chart-ready sample inside one UTC day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub timestamp_ms: i64,
    /// 0..=1439, from the UTC components of the timestamp.
    pub minute_of_day: u32,
    pub label: String,
    pub glucose: f64,
}

/// Parse a dataset timestamp as UTC. Accepts RFC 3339 and the bare
/// `YYYY-MM-DD[T ]HH:MM:SS` exports that omit an offset (treated as UTC).
pub fn parse_utc_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// UTC calendar-day key, `YYYY-MM-DD`. The grouping unit for every series
/// and summary; never derived from the viewer's time zone.
pub fn day_key(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

pub fn minute_of_day(timestamp: DateTime<Utc>) -> u32 {
    timestamp.hour() * 60 + timestamp.minute()
}

/// Convert one raw reading into its day key and trend point.
///
/// Returns `None` for readings with a null or non-finite value or an
/// unparseable timestamp; those are dropped from every downstream
/// computation rather than treated as zero.
pub fn normalize_reading(
    reading: &RawReading,
    labeler: &TimeLabeler,
) -> Option<(String, TrendPoint)> {
    let glucose = reading.value?;
    if !glucose.is_finite() {
        return None;
    }
    let timestamp = parse_utc_timestamp(&reading.utc)?;
    let point = TrendPoint {
        timestamp_ms: timestamp.timestamp_millis(),
        minute_of_day: minute_of_day(timestamp),
        label: labeler.label(timestamp),
        glucose,
    };
    Some((day_key(timestamp), point))
}
