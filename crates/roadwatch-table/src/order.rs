use std::{fmt, str::FromStr};

use roadwatch_types::{incident::IncidentRecord, RoadwatchError};
use serde::{Deserialize, Serialize};

/// Incident column the table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Timestamp,
    Confidence,
    #[serde(rename = "type")]
    Kind,
    #[serde(rename = "camera")]
    CameraId,
    CameraName,
    Id,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Timestamp,
        SortKey::Confidence,
        SortKey::Kind,
        SortKey::CameraId,
        SortKey::CameraName,
        SortKey::Id,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Timestamp => "timestamp",
            SortKey::Confidence => "confidence",
            SortKey::Kind => "type",
            SortKey::CameraId => "camera",
            SortKey::CameraName => "cameraName",
            SortKey::Id => "id",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            SortKey::Timestamp => "Time",
            SortKey::Confidence => "Confidence",
            SortKey::Kind => "Type",
            SortKey::CameraId => "Camera",
            SortKey::CameraName => "Camera Name",
            SortKey::Id => "ID",
        }
    }

    /// Text value for keys compared lexically; `None` for typed keys.
    pub(crate) fn text<'a>(self, record: &'a IncidentRecord) -> Option<&'a str> {
        match self {
            SortKey::Kind => Some(&record.kind),
            SortKey::CameraId => Some(&record.camera_id),
            SortKey::CameraName => Some(&record.camera_name),
            SortKey::Id => Some(&record.id),
            SortKey::Timestamp | SortKey::Confidence => None,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = RoadwatchError;

    /// Unknown names are rejected rather than compared as text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| RoadwatchError::UnknownSortKey(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: SortKey::Timestamp,
            direction: SortDirection::Descending,
        }
    }
}

/// Visibility filter on the `resolved` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Resolved,
}

impl FilterMode {
    pub const ALL: [FilterMode; 3] = [FilterMode::All, FilterMode::Active, FilterMode::Resolved];

    pub fn matches(self, record: &IncidentRecord) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !record.resolved,
            FilterMode::Resolved => record.resolved,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Active => "Active",
            FilterMode::Resolved => "Resolved",
        }
    }

    /// Next mode in button order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            FilterMode::All => FilterMode::Active,
            FilterMode::Active => FilterMode::Resolved,
            FilterMode::Resolved => FilterMode::All,
        }
    }
}

impl FromStr for FilterMode {
    type Err = RoadwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(FilterMode::All),
            "active" => Ok(FilterMode::Active),
            "resolved" => Ok(FilterMode::Resolved),
            other => Err(RoadwatchError::InvalidSetting(format!(
                "unknown filter mode: {other}"
            ))),
        }
    }
}
