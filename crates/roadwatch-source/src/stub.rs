use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use roadwatch_types::{
    camera::{CameraFeed, CameraStatus},
    config::ApiConfig,
    incident::IncidentRecord,
    stats::{DetectionStatus, StatsSnapshot},
    Result,
};
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use crate::DataSource;

const FRAME_PLACEHOLDER: &str = "https://placehold.co/640x360/1e2535/8b9ab4?text=Camera+";

/// Stand-in backend returning fixed literals after a simulated round trip.
pub struct StubSource {
    base_url: String,
    latency: Duration,
}

impl StubSource {
    pub fn new(config: &ApiConfig) -> Self {
        info!(
            "Using stub data source (base url {}, latency {}ms)",
            config.base_url, config.stub_latency_ms
        );
        Self {
            base_url: config.base_url.clone(),
            latency: Duration::from_millis(config.stub_latency_ms),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn round_trip(&self, path: &str) {
        debug!("Stub GET {}{}", self.base_url, path);
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl DataSource for StubSource {
    async fn fetch_frame(&self, camera_id: &str) -> Result<String> {
        self.round_trip(&format!("/cameras/{camera_id}/frame")).await;
        Ok(format!("{FRAME_PLACEHOLDER}{camera_id}"))
    }

    async fn fetch_camera_list(&self) -> Result<Vec<CameraFeed>> {
        self.round_trip("/cameras").await;
        Ok(vec![
            CameraFeed::new("CAM-01", "Highway I-95 North", CameraStatus::Online, 24.0),
            CameraFeed::new("CAM-02", "Highway I-95 South", CameraStatus::Online, 24.0),
            CameraFeed::new("CAM-03", "Exit 22 Interchange", CameraStatus::Warning, 12.0),
            CameraFeed::new("CAM-04", "Downtown Overpass", CameraStatus::Offline, 0.0),
        ])
    }

    async fn fetch_incidents(&self, limit: usize) -> Result<Vec<IncidentRecord>> {
        self.round_trip(&format!("/incidents?limit={limit}")).await;
        let now = Utc::now();
        let incident = |id: &str,
                        camera_id: &str,
                        camera_name: &str,
                        minutes_ago: i64,
                        kind: &str,
                        confidence: f64,
                        color: &str,
                        resolved: bool| IncidentRecord {
            id: id.into(),
            camera_id: camera_id.into(),
            camera_name: camera_name.into(),
            timestamp: now - ChronoDuration::minutes(minutes_ago),
            kind: kind.into(),
            confidence,
            thumbnail_url: format!("https://placehold.co/120x68/1e2535/{color}?text={id}"),
            resolved,
        };

        let mut incidents = vec![
            incident("INC-001", "CAM-01", "Highway I-95 North", 5, "Collision", 0.94, "ef4444", false),
            incident("INC-002", "CAM-03", "Exit 22 Interchange", 32, "Debris", 0.81, "f59e0b", true),
            incident("INC-003", "CAM-02", "Highway I-95 South", 78, "Stalled Vehicle", 0.77, "3b82f6", true),
            incident("INC-004", "CAM-01", "Highway I-95 North", 140, "Collision", 0.98, "ef4444", true),
        ];
        incidents.truncate(limit);
        Ok(incidents)
    }

    async fn fetch_stats(&self) -> Result<StatsSnapshot> {
        self.round_trip("/stats").await;
        Ok(StatsSnapshot {
            active_cameras: 3,
            total_cameras: 4,
            incidents_today: 2,
            detection_status: DetectionStatus::Active,
            uptime_percent: 99.2,
        })
    }
}
