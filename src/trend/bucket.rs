use std::collections::BTreeMap;

use crate::fmt::TimeLabeler;

use super::point::{normalize_reading, RawReading, TrendPoint};

/// Normalized points grouped by UTC day key. `BTreeMap` keeps the day keys
/// in ascending order, which is the order every caller wants them in.
pub type DayMap = BTreeMap<String, Vec<TrendPoint>>;

/// Bucket raw readings into per-day series, each sorted ascending by
/// timestamp. Pure and repeatable: the same reading set always produces the
/// same map. Readings the normalizer rejects are dropped here without a
/// trace.
pub fn build_day_map(readings: &[RawReading], labeler: &TimeLabeler) -> DayMap {
    let mut days: DayMap = BTreeMap::new();
    for reading in readings {
        if let Some((day, point)) = normalize_reading(reading, labeler) {
            days.entry(day).or_default().push(point);
        }
    }
    for points in days.values_mut() {
        // Stable sort: readings sharing a timestamp keep arrival order.
        points.sort_by_key(|point| point.timestamp_ms);
    }
    days
}

/// The sorted set of days that have at least one reading.
pub fn sorted_day_keys(days: &DayMap) -> Vec<String> {
    days.keys().cloned().collect()
}
