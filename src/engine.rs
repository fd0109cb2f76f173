use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::{
    config::{EngineConfig, ViewerPrefs},
    fmt::TimeLabeler,
    patterns::{self, PatternOverlay, ShapeLibrary},
    playback::{self, PlaybackController, PlaybackState, PlaybackSubscription},
    store::{DataStore, StoreStatus},
    trend::{self, DayMap, DayPartSummary, DaySummary, TrendPoint},
};

/// Result of resolving a requested day against the dataset.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayResolution {
    pub resolved_day: Option<String>,
    pub points: Vec<TrendPoint>,
    pub available_days: Vec<String>,
}

/// Facade tying the store, bucketer, summarizer, playback controller, and
/// overlay resolver together behind the operations the rendering layer
/// consumes.
#[derive(Clone)]
pub struct TrendEngine {
    store: DataStore,
    shapes: ShapeLibrary,
    playback: PlaybackController,
    config: EngineConfig,
    labeler: TimeLabeler,
}

impl TrendEngine {
    /// `data_root` holds the collaborator-exported files: the dataset, the
    /// pattern rules, and the `patternshapes/` templates. The viewer's
    /// locale drives label formatting only; the time zone preference is
    /// accepted but never consulted for day boundaries, which stay UTC.
    pub fn new(data_root: impl Into<PathBuf>, prefs: &ViewerPrefs, config: EngineConfig) -> Self {
        let root = data_root.into();
        let default_interval_ms = (config.default_step_minutes * 60_000.0) as u64;
        Self {
            store: DataStore::new(root.clone()),
            shapes: ShapeLibrary::new(root),
            playback: PlaybackController::new(config.initial_reveal, default_interval_ms),
            labeler: TimeLabeler::new(&prefs.locale),
            config,
        }
    }

    pub fn with_defaults(data_root: impl Into<PathBuf>) -> Self {
        Self::new(data_root, &ViewerPrefs::default(), EngineConfig::default())
    }

    async fn day_map(&self) -> DayMap {
        let readings = self.store.readings().await;
        trend::build_day_map(&readings, &self.labeler)
    }

    fn pinned_window(&self) -> Option<(&str, &str)> {
        self.config
            .pinned_window
            .as_ref()
            .map(|(start, end)| (start.as_str(), end.as_str()))
    }

    fn step_minutes_for(&self, points: &[TrendPoint]) -> f64 {
        let default_ms = (self.config.default_step_minutes * 60_000.0) as u64;
        playback::infer_interval_ms(points, default_ms) as f64 / 60_000.0
    }

    /// Every day with at least one reading, sorted ascending.
    pub async fn all_days(&self) -> Vec<String> {
        trend::sorted_day_keys(&self.day_map().await)
    }

    /// The navigation window (pinned range intersection, or the most recent
    /// days up to the cap).
    pub async fn available_days(&self) -> Vec<String> {
        let days = self.all_days().await;
        trend::visible_days(&days, self.pinned_window(), self.config.visible_day_cap)
    }

    /// Resolve a requested day and return its full series together with the
    /// navigation window.
    pub async fn resolve_day_series(&self, requested: Option<&str>) -> DayResolution {
        let day_map = self.day_map().await;
        let all_days = trend::sorted_day_keys(&day_map);
        let available_days =
            trend::visible_days(&all_days, self.pinned_window(), self.config.visible_day_cap);
        let resolved_day = trend::resolve_day(requested, &all_days);
        let points = resolved_day
            .as_deref()
            .and_then(|day| day_map.get(day))
            .cloned()
            .unwrap_or_default();

        DayResolution {
            resolved_day,
            points,
            available_days,
        }
    }

    /// Summary for one day. The final reading's weight falls back to the
    /// day's inferred sampling step. A day without data summarizes to all
    /// zeros.
    pub async fn summarize_day(&self, day: &str) -> DaySummary {
        let day_map = self.day_map().await;
        let points = day_map.get(day).map(Vec::as_slice).unwrap_or(&[]);
        let step = self.step_minutes_for(points);
        trend::summarize_day(day, points, &self.config.band, step)
    }

    /// Summaries for every day with data, keyed by day. Calendar views use
    /// the fixed default step for each day's final reading.
    pub async fn summarize_all(&self) -> BTreeMap<String, DaySummary> {
        let day_map = self.day_map().await;
        day_map
            .iter()
            .map(|(day, points)| {
                let summary = trend::summarize_day(
                    day,
                    points,
                    &self.config.band,
                    self.config.default_step_minutes,
                );
                (day.clone(), summary)
            })
            .collect()
    }

    /// The four fixed quarters of a day, scored for the daily-patterns
    /// panel.
    pub async fn day_part_segments(&self, day: &str) -> Vec<DayPartSummary> {
        let day_map = self.day_map().await;
        let points = day_map.get(day).map(Vec::as_slice).unwrap_or(&[]);
        let step = self.step_minutes_for(points);
        trend::day_part_segments(points, &self.config.band, step)
    }

    /// Begin live playback for the requested (or most recent) day,
    /// cancelling any previous playback. `None` when no day has data.
    pub async fn subscribe_playback(
        &self,
        requested: Option<&str>,
    ) -> Option<PlaybackSubscription> {
        let resolution = self.resolve_day_series(requested).await;
        let day = resolution.resolved_day?;
        Some(self.playback.subscribe(&day, resolution.points).await)
    }

    pub async fn stop_playback(&self) {
        self.playback.stop().await;
    }

    pub async fn playback_state(&self) -> PlaybackState {
        self.playback.snapshot().await
    }

    /// Overlay curves for a day's detected patterns, in detection order.
    pub async fn resolve_overlays(&self, day: &str) -> Vec<PatternOverlay> {
        let detections = self.store.detections_for(day).await;
        patterns::resolve_overlays(&self.shapes, day, &detections, &self.labeler).await
    }

    pub async fn store_status(&self) -> StoreStatus {
        self.store.status().await
    }
}
