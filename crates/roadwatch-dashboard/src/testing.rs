use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use roadwatch_source::{fetch_error, DataSource};
use roadwatch_types::{
    camera::{CameraFeed, CameraStatus},
    incident::IncidentRecord,
    stats::{DetectionStatus, StatsSnapshot},
    Result,
};

/// In-memory source for screen tests. Each failure flag trips one method.
#[derive(Default)]
pub struct FakeSource {
    pub cameras: Mutex<Vec<CameraFeed>>,
    pub incidents: Mutex<Vec<IncidentRecord>>,
    pub fail_stats: AtomicBool,
    pub fail_incidents: AtomicBool,
    pub fail_cameras: AtomicBool,
    pub frame_calls: AtomicUsize,
    pub incident_calls: AtomicUsize,
}

impl FakeSource {
    pub fn populated() -> Self {
        let source = Self::default();
        *source.cameras.lock().expect("cameras") = vec![
            CameraFeed::new("CAM-01", "Highway I-95 North", CameraStatus::Online, 24.0),
            CameraFeed::new("CAM-03", "Exit 22 Interchange", CameraStatus::Warning, 12.0),
            CameraFeed::new("CAM-04", "Downtown Overpass", CameraStatus::Offline, 0.0),
        ];
        *source.incidents.lock().expect("incidents") = (0..12)
            .map(|i| incident(&format!("INC-{i:03}"), i * 10, i % 2 == 1))
            .collect();
        source
    }
}

pub fn incident(id: &str, minutes_ago: i64, resolved: bool) -> IncidentRecord {
    IncidentRecord {
        id: id.into(),
        camera_id: "CAM-01".into(),
        camera_name: "Highway I-95 North".into(),
        timestamp: Utc::now() - ChronoDuration::minutes(minutes_ago),
        kind: if resolved { "Debris" } else { "Collision" }.into(),
        confidence: 0.8,
        thumbnail_url: String::new(),
        resolved,
    }
}

#[async_trait]
impl DataSource for FakeSource {
    async fn fetch_frame(&self, camera_id: &str) -> Result<String> {
        self.frame_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("frame://{camera_id}"))
    }

    async fn fetch_camera_list(&self) -> Result<Vec<CameraFeed>> {
        if self.fail_cameras.load(Ordering::SeqCst) {
            return Err(fetch_error("GET /cameras failed: 503 Service Unavailable"));
        }
        Ok(self.cameras.lock().expect("cameras").clone())
    }

    async fn fetch_incidents(&self, limit: usize) -> Result<Vec<IncidentRecord>> {
        self.incident_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_incidents.load(Ordering::SeqCst) {
            return Err(fetch_error("GET /incidents failed: 500 Internal Server Error"));
        }
        let incidents = self.incidents.lock().expect("incidents");
        Ok(incidents.iter().take(limit).cloned().collect())
    }

    async fn fetch_stats(&self) -> Result<StatsSnapshot> {
        if self.fail_stats.load(Ordering::SeqCst) {
            return Err(fetch_error("GET /stats failed: 502 Bad Gateway"));
        }
        Ok(StatsSnapshot {
            active_cameras: 2,
            total_cameras: 3,
            incidents_today: 1,
            detection_status: DetectionStatus::Degraded,
            uptime_percent: 97.5,
        })
    }
}
