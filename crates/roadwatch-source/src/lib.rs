//! Data-source abstraction feeding cameras, frames, incidents and stats.

use async_trait::async_trait;
use roadwatch_types::{
    camera::CameraFeed, incident::IncidentRecord, stats::StatsSnapshot, RoadwatchError, Result,
};

mod stub;

pub use stub::StubSource;

/// Backend contract consumed by the dashboard core.
///
/// Every method may fail with [`RoadwatchError::FetchFailed`]; callers treat
/// the message as user-facing text.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// URL of the latest processed frame for one camera.
    async fn fetch_frame(&self, camera_id: &str) -> Result<String>;
    async fn fetch_camera_list(&self) -> Result<Vec<CameraFeed>>;
    /// Most recent incidents first, at most `limit` of them.
    async fn fetch_incidents(&self, limit: usize) -> Result<Vec<IncidentRecord>>;
    async fn fetch_stats(&self) -> Result<StatsSnapshot>;
}

/// Generate an error aligned with data-source semantics.
pub fn fetch_error(message: impl Into<String>) -> RoadwatchError {
    RoadwatchError::FetchFailed(message.into())
}
