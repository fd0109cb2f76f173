use serde::{Deserialize, Serialize};

use crate::config::GlucoseBand;

use super::point::TrendPoint;

/// Derived, read-only snapshot of one day. A pure function of the day's
/// series; recomputed on demand, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub day: String,
    /// Percentage of elapsed time inside the band, 0..=100.
    pub tir: f64,
    /// Unweighted arithmetic mean. Intentionally simpler than the
    /// duration-weighted TIR.
    pub avg_glucose: f64,
    pub time_in_range_minutes: f64,
    pub total_minutes: f64,
    pub readings: usize,
}

/// Coarse calendar coloring band for a day's TIR.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TirQuality {
    Good,
    Fair,
    Poor,
}

impl DaySummary {
    pub fn quality(&self) -> TirQuality {
        if self.tir >= 70.0 {
            TirQuality::Good
        } else if self.tir >= 50.0 {
            TirQuality::Fair
        } else {
            TirQuality::Poor
        }
    }
}

/// Time-in-range over a sub-window of a day.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WindowTir {
    pub tir: f64,
    pub in_range_minutes: f64,
    pub total_minutes: f64,
}

/// One of the four fixed quarters of a day.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayPartSummary {
    pub label: &'static str,
    pub score: u32,
    pub status: &'static str,
}

const DAY_PARTS: [(&str, u32, u32); 4] = [
    ("Night (0-6)", 0, 360),
    ("Morning (6-12)", 360, 720),
    ("Afternoon (12-18)", 720, 1080),
    ("Evening (18-24)", 1080, 1440),
];

/// Minutes of weight a reading carries: the gap to its successor, floored
/// at one minute so duplicate timestamps still count.
fn gap_minutes(current: &TrendPoint, next: &TrendPoint) -> f64 {
    ((next.timestamp_ms - current.timestamp_ms) as f64 / 60_000.0).max(1.0)
}

/// Summarize one day's ordered series.
///
/// Each reading is weighted by the time until the *next* reading; the final
/// reading, having no successor, gets `fallback_step_minutes`. This keeps
/// TIR unbiased when sampling gaps vary. An empty series yields an all-zero
/// summary rather than an error.
pub fn summarize_day(
    day: &str,
    points: &[TrendPoint],
    band: &GlucoseBand,
    fallback_step_minutes: f64,
) -> DaySummary {
    if points.is_empty() {
        return DaySummary {
            day: day.to_string(),
            tir: 0.0,
            avg_glucose: 0.0,
            time_in_range_minutes: 0.0,
            total_minutes: 0.0,
            readings: 0,
        };
    }

    let mut total_minutes = 0.0;
    let mut time_in_range = 0.0;
    let mut glucose_sum = 0.0;

    for (i, current) in points.iter().enumerate() {
        let delta = match points.get(i + 1) {
            Some(next) => gap_minutes(current, next),
            None => fallback_step_minutes,
        };
        total_minutes += delta;
        if band.contains(current.glucose) {
            time_in_range += delta;
        }
        glucose_sum += current.glucose;
    }

    DaySummary {
        day: day.to_string(),
        tir: if total_minutes > 0.0 {
            time_in_range / total_minutes * 100.0
        } else {
            0.0
        },
        avg_glucose: glucose_sum / points.len() as f64,
        time_in_range_minutes: time_in_range,
        total_minutes,
        readings: points.len(),
    }
}

/// Time-in-range restricted to `[start_minute, end_minute)` of the day.
///
/// Points outside the window are skipped; a segment that would run past the
/// window boundary has its weight clipped so the window never over-counts.
/// The successor used for the gap is the day's actual next point even when
/// that point lies outside the window.
pub fn window_time_in_range(
    points: &[TrendPoint],
    band: &GlucoseBand,
    fallback_step_minutes: f64,
    start_minute: u32,
    end_minute: u32,
) -> WindowTir {
    let mut total_minutes = 0.0;
    let mut in_range_minutes = 0.0;

    for (i, current) in points.iter().enumerate() {
        if current.minute_of_day < start_minute || current.minute_of_day >= end_minute {
            continue;
        }

        let next = points.get(i + 1);
        let next_minutes = next
            .map(|n| n.minute_of_day.min(end_minute))
            .unwrap_or(end_minute);
        let mut delta = match next {
            Some(next) => gap_minutes(current, next),
            None => fallback_step_minutes,
        };

        let remaining_within_window = next_minutes as f64 - current.minute_of_day as f64;
        if remaining_within_window > 0.0 {
            delta = delta.min(remaining_within_window);
        }

        total_minutes += delta;
        if band.contains(current.glucose) {
            in_range_minutes += delta;
        }
    }

    WindowTir {
        tir: if total_minutes > 0.0 {
            in_range_minutes / total_minutes * 100.0
        } else {
            0.0
        },
        in_range_minutes,
        total_minutes,
    }
}

/// Score the four fixed quarters of a day. An empty day renders as
/// placeholder rows; a quarter without readings scores zero.
pub fn day_part_segments(
    points: &[TrendPoint],
    band: &GlucoseBand,
    fallback_step_minutes: f64,
) -> Vec<DayPartSummary> {
    if points.is_empty() {
        return DAY_PARTS
            .iter()
            .map(|&(label, _, _)| DayPartSummary {
                label,
                score: 0,
                status: "--",
            })
            .collect();
    }

    DAY_PARTS
        .iter()
        .map(|&(label, start, end)| {
            let window = window_time_in_range(points, band, fallback_step_minutes, start, end);
            DayPartSummary {
                label,
                score: window.tir.round() as u32,
                status: day_part_status(window.tir),
            }
        })
        .collect()
}

fn day_part_status(percentage: f64) -> &'static str {
    if percentage >= 80.0 {
        "Excellent"
    } else if percentage >= 60.0 {
        "Good"
    } else if percentage >= 40.0 {
        "Moderate"
    } else {
        "Needs attention"
    }
}
