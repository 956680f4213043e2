use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CONFIDENCE_THRESHOLD_HIGH: f64 = 0.9;
pub const CONFIDENCE_THRESHOLD_MEDIUM: f64 = 0.75;

/// Detected incident as reported by the data source.
///
/// `confidence` is expected in `[0, 1]`. Out-of-range values are passed
/// through untouched; validating them is the data source's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    pub id: String,
    pub camera_id: String,
    pub camera_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub confidence: f64,
    pub thumbnail_url: String,
    pub resolved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl IncidentRecord {
    pub fn confidence_band(&self) -> ConfidenceBand {
        if self.confidence >= CONFIDENCE_THRESHOLD_HIGH {
            ConfidenceBand::High
        } else if self.confidence >= CONFIDENCE_THRESHOLD_MEDIUM {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn confidence_percent(&self) -> String {
        format!("{:.0}%", self.confidence * 100.0)
    }

    pub fn status_label(&self) -> &'static str {
        if self.resolved {
            "Resolved"
        } else {
            "Active"
        }
    }
}
