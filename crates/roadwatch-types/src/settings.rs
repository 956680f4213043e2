use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{RoadwatchError, Result};

/// Preference key under which the settings form is persisted.
pub const SETTINGS_KEY: &str = "tad_settings";

pub const MIN_POLL_INTERVAL_MS: u64 = 500;
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;
pub const POLL_INTERVAL_STEP_MS: u64 = 500;

/// User-editable dashboard preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub api_base_url: String,
    #[serde(rename = "pollInterval")]
    pub poll_interval_ms: u64,
    pub camera_ids: String,
    pub alert_threshold: f64,
    pub enable_alerts: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".into(),
            poll_interval_ms: 5000,
            camera_ids: "CAM-01, CAM-02, CAM-03, CAM-04".into(),
            alert_threshold: 0.75,
            enable_alerts: true,
        }
    }
}

impl Settings {
    /// Overlays a stored blob on top of the defaults, key by key.
    ///
    /// A blob that is not an object yields the defaults. Within an object each
    /// field falls back on its own, so one ill-typed value never discards the
    /// others. Numeric fields also accept numeric strings.
    pub fn from_stored(stored: &Value) -> Self {
        let mut settings = Self::default();
        let Value::Object(stored) = stored else {
            return settings;
        };
        overlay(stored, "apiBaseUrl", &mut settings.api_base_url);
        overlay_number(stored, "pollInterval", &mut settings.poll_interval_ms);
        overlay(stored, "cameraIds", &mut settings.camera_ids);
        overlay_number(stored, "alertThreshold", &mut settings.alert_threshold);
        overlay(stored, "enableAlerts", &mut settings.enable_alerts);
        settings
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|err| RoadwatchError::Preferences(format!("failed to encode settings: {err}")))
    }

    pub fn camera_id_list(&self) -> Vec<String> {
        self.camera_ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&self.poll_interval_ms) {
            return Err(RoadwatchError::InvalidSetting(format!(
                "poll interval must be between {MIN_POLL_INTERVAL_MS} and {MAX_POLL_INTERVAL_MS} ms"
            )));
        }
        if !(0.5..=1.0).contains(&self.alert_threshold) {
            return Err(RoadwatchError::InvalidSetting(
                "alert threshold must be between 0.5 and 1.0".into(),
            ));
        }
        Ok(())
    }
}

fn overlay<T: DeserializeOwned>(stored: &Map<String, Value>, key: &str, slot: &mut T) {
    if let Some(value) = stored.get(key) {
        if let Ok(parsed) = T::deserialize(value) {
            *slot = parsed;
        }
    }
}

fn overlay_number<T>(stored: &Map<String, Value>, key: &str, slot: &mut T)
where
    T: DeserializeOwned + FromStr,
{
    match stored.get(key) {
        Some(Value::String(text)) => {
            if let Ok(parsed) = text.trim().parse() {
                *slot = parsed;
            }
        }
        Some(_) => overlay(stored, key, slot),
        None => {}
    }
}
