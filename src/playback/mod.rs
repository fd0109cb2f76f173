pub mod controller;
pub mod state;

pub use controller::{PlaybackController, PlaybackSubscription};
pub use state::{PlaybackFrame, PlaybackState, PlaybackStatus};

use crate::trend::TrendPoint;

/// Tick interval inferred from the gap between a series' first two points,
/// floored at one millisecond. Falls back to the default when fewer than
/// two points exist.
pub fn infer_interval_ms(series: &[TrendPoint], default_ms: u64) -> u64 {
    if series.len() > 1 {
        (series[1].timestamp_ms - series[0].timestamp_ms).max(1) as u64
    } else {
        default_ms
    }
}
