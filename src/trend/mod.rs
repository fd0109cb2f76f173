pub mod bucket;
pub mod point;
pub mod summary;
pub mod window;

pub use bucket::{build_day_map, sorted_day_keys, DayMap};
pub use point::{day_key, normalize_reading, parse_utc_timestamp, RawReading, TrendPoint};
pub use summary::{
    day_part_segments, summarize_day, window_time_in_range, DayPartSummary, DaySummary,
    TirQuality, WindowTir,
};
pub use window::{resolve_day, visible_days};
