use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStatus {
    Active,
    Degraded,
    Offline,
}

impl DetectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            DetectionStatus::Active => "Active",
            DetectionStatus::Degraded => "Degraded",
            DetectionStatus::Offline => "Offline",
        }
    }
}

/// High-level figures for the dashboard overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub active_cameras: u32,
    pub total_cameras: u32,
    pub incidents_today: u32,
    pub detection_status: DetectionStatus,
    pub uptime_percent: f64,
}
