use serde::{Deserialize, Serialize};

/// Health reported by the backend for a single camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraStatus {
    Online,
    Warning,
    Offline,
}

impl CameraStatus {
    pub fn label(self) -> &'static str {
        match self {
            CameraStatus::Online => "Online",
            CameraStatus::Warning => "Warning",
            CameraStatus::Offline => "Offline",
        }
    }

    /// Offline cameras are fetched once but never continuously polled.
    pub fn is_polled(self) -> bool {
        !matches!(self, CameraStatus::Offline)
    }
}

/// Canonical camera record owned by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraFeed {
    pub id: String,
    pub name: String,
    pub status: CameraStatus,
    pub fps: f32,
}

impl CameraFeed {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: CameraStatus, fps: f32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
            fps,
        }
    }

    /// Frame rate is only meaningful while the camera is reachable.
    pub fn display_fps(&self) -> Option<f32> {
        self.status.is_polled().then_some(self.fps)
    }
}

/// Per-status tallies shown above the live feed grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSummary {
    pub online: usize,
    pub warning: usize,
    pub offline: usize,
}

impl CameraSummary {
    pub fn from_feeds<'a>(feeds: impl IntoIterator<Item = &'a CameraFeed>) -> Self {
        feeds
            .into_iter()
            .fold(Self::default(), |mut summary, feed| {
                match feed.status {
                    CameraStatus::Online => summary.online += 1,
                    CameraStatus::Warning => summary.warning += 1,
                    CameraStatus::Offline => summary.offline += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.online + self.warning + self.offline
    }
}
