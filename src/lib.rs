//! Glucose trend engine: buckets CGM readings into UTC day series, computes
//! duration-weighted time-in-range summaries, replays a day's series as a
//! simulated live feed, and aligns pattern shape templates onto a day's
//! absolute timeline.
//!
//! Day boundaries are always UTC; the viewer's locale affects label
//! formatting only. See [`TrendEngine`] for the exposed operations.

pub mod config;
pub mod engine;
pub mod fmt;
pub mod patterns;
pub mod playback;
pub mod store;
pub mod trend;

pub use config::{EngineConfig, GlucoseBand, ViewerPrefs};
pub use engine::{DayResolution, TrendEngine};
pub use patterns::{actions_for, PatternDetection, PatternOverlay, ShapeLibrary};
pub use playback::{PlaybackFrame, PlaybackState, PlaybackStatus, PlaybackSubscription};
pub use store::{DataStore, StoreStatus};
pub use trend::{DayMap, DaySummary, RawReading, TirQuality, TrendPoint};
