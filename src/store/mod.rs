use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::patterns::PatternDetection;
use crate::trend::RawReading;

pub const DATASET_FILE: &str = "glucose_trend.json";
pub const RULES_FILE: &str = "pattern_rules.json";

/// Load state surfaced to the dashboard's degraded banner.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    pub loaded: bool,
    pub error: Option<String>,
}

#[derive(Default)]
struct StoreState {
    dataset: Option<Arc<Vec<RawReading>>>,
    rules: Option<Arc<HashMap<String, Vec<PatternDetection>>>>,
    last_error: Option<String>,
}

/// File-backed store for the collaborator-exported dataset and pattern
/// rules under one data root.
///
/// Each file is read once per session and cached. A failed load degrades to
/// an empty result for that call *without* caching, so a later call retries
/// the read. The cache lock doubles as a single-flight guard: concurrent
/// first loads collapse into one read.
#[derive(Clone)]
pub struct DataStore {
    root: PathBuf,
    state: Arc<Mutex<StoreState>>,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: Arc::new(Mutex::new(StoreState::default())),
        }
    }

    /// The raw reading collection, cached after the first successful load.
    pub async fn readings(&self) -> Arc<Vec<RawReading>> {
        let mut state = self.state.lock().await;
        if let Some(dataset) = &state.dataset {
            return Arc::clone(dataset);
        }

        match load_dataset(&self.root.join(DATASET_FILE)).await {
            Ok(readings) => {
                info!("loaded {} raw glucose readings", readings.len());
                let dataset = Arc::new(readings);
                state.dataset = Some(Arc::clone(&dataset));
                state.last_error = None;
                dataset
            }
            Err(err) => {
                warn!("unable to load glucose dataset: {err:#}");
                state.last_error = Some(format!("{err:#}"));
                Arc::new(Vec::new())
            }
        }
    }

    /// Per-day pattern detections, cached after the first successful load.
    /// A missing or malformed rules file degrades to "no detections".
    pub async fn pattern_rules(&self) -> Arc<HashMap<String, Vec<PatternDetection>>> {
        let mut state = self.state.lock().await;
        if let Some(rules) = &state.rules {
            return Arc::clone(rules);
        }

        match load_rules(&self.root.join(RULES_FILE)).await {
            Ok(rules) => {
                info!("loaded pattern rules for {} days", rules.len());
                let rules = Arc::new(rules);
                state.rules = Some(Arc::clone(&rules));
                rules
            }
            Err(err) => {
                warn!("unable to load pattern rules: {err:#}");
                Arc::new(HashMap::new())
            }
        }
    }

    pub async fn detections_for(&self, day: &str) -> Vec<PatternDetection> {
        self.pattern_rules()
            .await
            .get(day)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn status(&self) -> StoreStatus {
        let state = self.state.lock().await;
        StoreStatus {
            loaded: state.dataset.is_some(),
            error: state.last_error.clone(),
        }
    }
}

async fn load_dataset(path: &Path) -> Result<Vec<RawReading>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let payload: Value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(unwrap_dataset_envelope(payload))
}

/// The dataset ships either as a bare array of readings or wrapped in a
/// `{ "data": { "rawData": [...] } }` envelope. Anything else is an empty
/// dataset. Entries that fail to deserialize are dropped individually.
fn unwrap_dataset_envelope(payload: Value) -> Vec<RawReading> {
    let entries = match payload {
        Value::Array(entries) => entries,
        mut other => match other.pointer_mut("/data/rawData").map(Value::take) {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        },
    };

    let total = entries.len();
    let readings: Vec<RawReading> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    if readings.len() < total {
        debug!("dropped {} malformed dataset entries", total - readings.len());
    }
    readings
}

async fn load_rules(path: &Path) -> Result<HashMap<String, Vec<PatternDetection>>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const BARE: &str = r#"[
        { "utc": "2025-11-12T00:00:00Z", "value": 92.0 },
        { "utc": "2025-11-12T00:05:00Z", "value": null }
    ]"#;

    fn data_root(dataset: Option<&str>, rules: Option<&str>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        if let Some(dataset) = dataset {
            fs::write(dir.path().join(DATASET_FILE), dataset).unwrap();
        }
        if let Some(rules) = rules {
            fs::write(dir.path().join(RULES_FILE), rules).unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn loads_bare_array_dataset() {
        let root = data_root(Some(BARE), None);
        let store = DataStore::new(root.path());

        let readings = store.readings().await;
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].value, Some(92.0));
        assert_eq!(readings[1].value, None);

        let status = store.status().await;
        assert!(status.loaded);
        assert_eq!(status.error, None);
    }

    #[tokio::test]
    async fn envelope_and_bare_array_load_identically() {
        let enveloped = format!(r#"{{ "data": {{ "rawData": {BARE} }} }}"#);
        let bare_root = data_root(Some(BARE), None);
        let env_root = data_root(Some(&enveloped), None);

        let from_bare = DataStore::new(bare_root.path()).readings().await;
        let from_env = DataStore::new(env_root.path()).readings().await;

        assert_eq!(from_bare.len(), from_env.len());
        assert_eq!(from_bare[0].utc, from_env[0].utc);
    }

    #[tokio::test]
    async fn failed_dataset_load_degrades_and_retries() {
        let root = data_root(None, None);
        let store = DataStore::new(root.path());

        let readings = store.readings().await;
        assert!(readings.is_empty());
        let status = store.status().await;
        assert!(!status.loaded);
        assert!(status.error.is_some());

        // The failure was not cached: once the file exists the next call
        // loads it and clears the error.
        fs::write(root.path().join(DATASET_FILE), BARE).unwrap();
        let readings = store.readings().await;
        assert_eq!(readings.len(), 2);
        let status = store.status().await;
        assert!(status.loaded);
        assert_eq!(status.error, None);
    }

    #[tokio::test]
    async fn successful_dataset_load_is_cached() {
        let root = data_root(Some(BARE), None);
        let store = DataStore::new(root.path());

        let first = store.readings().await;
        fs::write(root.path().join(DATASET_FILE), "[]").unwrap();
        let second = store.readings().await;

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn missing_rules_degrade_to_no_detections() {
        let root = data_root(Some(BARE), None);
        let store = DataStore::new(root.path());

        assert!(store.detections_for("2025-11-12").await.is_empty());
        // Dataset status is unaffected by the rules file.
        assert_eq!(store.status().await.error, None);
    }

    #[tokio::test]
    async fn rules_index_by_day() {
        let rules = r#"{
            "2025-11-12": [
                { "pattern_id": "dawn_phenomenon", "metrics": { "night_count": 2 } },
                { "pattern_id": "frequent_spike" }
            ],
            "2025-11-13": []
        }"#;
        let root = data_root(Some(BARE), Some(rules));
        let store = DataStore::new(root.path());

        let detections = store.detections_for("2025-11-12").await;
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].pattern_id, "dawn_phenomenon");
        assert!(detections[1].metrics.is_empty());
        assert!(store.detections_for("2025-11-13").await.is_empty());
        assert!(store.detections_for("2025-11-14").await.is_empty());
    }

    #[tokio::test]
    async fn malformed_entries_are_dropped_individually() {
        let dataset = r#"[
            { "utc": "2025-11-12T00:00:00Z", "value": 92.0 },
            { "utc": "2025-11-12T00:05:00Z", "value": "high" },
            { "wrong": true }
        ]"#;
        let root = data_root(Some(dataset), None);
        let store = DataStore::new(root.path());

        let readings = store.readings().await;
        assert_eq!(readings.len(), 1);
    }
}
