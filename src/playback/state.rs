use serde::{Deserialize, Serialize};

use crate::trend::TrendPoint;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    Idle,
    Streaming,
    Completed,
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        PlaybackStatus::Idle
    }
}

/// One playback emission: the full revealed prefix of the day's series in
/// stored order. Frames only ever grow until `done`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackFrame {
    pub day: String,
    pub points: Vec<TrendPoint>,
    pub revealed: usize,
    pub total: usize,
    pub done: bool,
    pub update_interval_minutes: f64,
}

impl PlaybackFrame {
    /// The most recently revealed point, if any.
    pub fn latest(&self) -> Option<&TrendPoint> {
        self.points.last()
    }
}

/// Snapshot of the controller's current run.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub subscription_id: Option<String>,
    pub day: Option<String>,
    pub revealed: usize,
    pub total: usize,
    pub update_interval_ms: u64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            status: PlaybackStatus::Idle,
            subscription_id: None,
            day: None,
            revealed: 0,
            total: 0,
            update_interval_ms: 0,
        }
    }
}
