use serde::{Deserialize, Serialize};

/// Inclusive clinical glucose band in mg/dL.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GlucoseBand {
    pub low: f64,
    pub high: f64,
}

impl Default for GlucoseBand {
    fn default() -> Self {
        // Daily-overview band used across the dashboard
        Self {
            low: 70.0,
            high: 140.0,
        }
    }
}

impl GlucoseBand {
    pub fn contains(&self, glucose: f64) -> bool {
        glucose >= self.low && glucose <= self.high
    }
}

/// Configuration for the trend engine with tunable thresholds.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Band used for time-in-range computations.
    pub band: GlucoseBand,

    /// Fallback sampling step in minutes, used when a point has no successor
    /// to measure the gap against.
    pub default_step_minutes: f64,

    /// Number of points revealed immediately when playback starts
    /// (288 = one full day at 5-minute resolution).
    pub initial_reveal: usize,

    /// Maximum number of days exposed in the navigation window.
    pub visible_day_cap: usize,

    /// Optional inclusive day-key range pinning the navigation window.
    /// When the dataset intersects this range, only days inside it are shown.
    pub pinned_window: Option<(String, String)>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            band: GlucoseBand::default(),
            default_step_minutes: 5.0,
            initial_reveal: 288,
            visible_day_cap: 10,
            pinned_window: None,
        }
    }
}

/// Presentation preferences owned by the viewer. The locale drives label
/// formatting only; day bucketing stays UTC no matter what time zone the
/// viewer is in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerPrefs {
    pub locale: String,
    pub timezone: String,
}

impl Default for ViewerPrefs {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            timezone: "UTC".into(),
        }
    }
}
