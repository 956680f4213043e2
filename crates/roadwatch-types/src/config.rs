use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{RoadwatchError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Artificial delay applied by the stub data source.
    #[serde(default)]
    pub stub_latency_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Zero disables automatic refresh.
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentsConfig {
    pub default_limit: usize,
    pub dashboard_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsConfig {
    pub log_level: String,
    pub log_file: Option<String>,
    pub prefs_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadwatchConfig {
    pub api: ApiConfig,
    pub feed: FeedConfig,
    pub incidents: IncidentsConfig,
    pub ops: OpsConfig,
}

impl RoadwatchConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|err| {
            RoadwatchError::Configuration(format!(
                "unable to read config file {}: {err}",
                path_ref.display()
            ))
        })?;
        toml::from_str(&contents).map_err(|err| {
            RoadwatchError::Configuration(format!(
                "failed to parse config file {}: {err}",
                path_ref.display()
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(RoadwatchError::Configuration(
                "api.base_url must not be empty".into(),
            ));
        }
        if self.incidents.default_limit == 0 {
            return Err(RoadwatchError::Configuration(
                "incidents.default_limit must be greater than zero".into(),
            ));
        }
        if self.incidents.dashboard_limit == 0 {
            return Err(RoadwatchError::Configuration(
                "incidents.dashboard_limit must be greater than zero".into(),
            ));
        }
        if self.ops.prefs_dir.trim().is_empty() {
            return Err(RoadwatchError::Configuration(
                "ops.prefs_dir must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for RoadwatchConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "/api".into(),
                stub_latency_ms: 50,
            },
            feed: FeedConfig {
                poll_interval_ms: 5000,
            },
            incidents: IncidentsConfig {
                default_limit: 20,
                dashboard_limit: 5,
            },
            ops: OpsConfig {
                log_level: "info".into(),
                log_file: Some("roadwatch.log".into()),
                prefs_dir: ".roadwatch".into(),
            },
        }
    }
}
