use roadwatch_source::DataSource;
use roadwatch_table::{DerivedRows, SortKey, TableViewModel};
use roadwatch_types::{
    incident::IncidentRecord,
    stats::{DetectionStatus, StatsSnapshot},
};
use serde::Serialize;
use tracing::{info, warn};

use crate::alerts::{AlertBanner, AlertKind, BannerShelf};

const MISSING: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatVariant {
    Neutral,
    Good,
    Warn,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub label: &'static str,
    pub value: String,
    pub unit: Option<&'static str>,
    pub icon: &'static str,
    pub variant: StatVariant,
    pub description: &'static str,
}

/// Landing screen: headline statistics plus the most recent incidents.
#[derive(Debug, Default)]
pub struct Overview {
    stats: Option<StatsSnapshot>,
    recent: Vec<IncidentRecord>,
    error: Option<String>,
    loaded: bool,
    table: TableViewModel,
    shelf: BannerShelf,
}

impl Overview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches stats and recent incidents together; either failure becomes
    /// the screen error and leaves the previous data in place.
    pub async fn load<S>(&mut self, source: &S, limit: usize)
    where
        S: DataSource + ?Sized,
    {
        match tokio::try_join!(source.fetch_stats(), source.fetch_incidents(limit)) {
            Ok((stats, recent)) => {
                info!("Dashboard loaded {} recent incidents", recent.len());
                self.stats = Some(stats);
                self.recent = recent;
                self.error = None;
            }
            Err(err) => {
                warn!(error = %err, "Dashboard load failed");
                self.error = Some(err.to_string());
            }
        }
        self.loaded = true;
    }

    pub fn is_loading(&self) -> bool {
        !self.loaded
    }

    pub fn stats(&self) -> Option<&StatsSnapshot> {
        self.stats.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn recent(&self) -> &[IncidentRecord] {
        &self.recent
    }

    pub fn rows(&self) -> DerivedRows<'_> {
        self.table.view(&self.recent)
    }

    pub fn table(&self) -> &TableViewModel {
        &self.table
    }

    pub fn sort_by(&mut self, key: SortKey) {
        self.table.set_sort(key);
    }

    pub fn active_incidents(&self) -> impl Iterator<Item = &IncidentRecord> {
        self.recent.iter().filter(|incident| !incident.resolved)
    }

    pub fn banners(&self) -> Vec<AlertBanner> {
        let mut banners = Vec::new();
        let active: Vec<_> = self.active_incidents().collect();
        if !active.is_empty() {
            let plural = if active.len() > 1 { "s" } else { "" };
            let detail = active
                .iter()
                .map(|incident| format!("{} — {}", incident.camera_id, incident.kind))
                .collect::<Vec<_>>()
                .join(" · ");
            banners.push(
                AlertBanner::new(
                    AlertKind::Danger,
                    format!("{} active incident{plural} detected", active.len()),
                )
                .with_detail(detail),
            );
        }
        if let Some(error) = &self.error {
            banners.push(
                AlertBanner::new(AlertKind::Warning, "Could not load dashboard data")
                    .with_detail(error.clone()),
            );
        }
        self.shelf.visible(banners)
    }

    pub fn dismiss_banners(&mut self) {
        let visible = self.banners();
        self.shelf.dismiss_all(&visible);
    }

    pub fn stat_cards(&self) -> Vec<StatCard> {
        let stats = self.stats.as_ref();
        vec![
            StatCard {
                label: "Active Cameras",
                value: stats
                    .map(|s| format!("{}/{}", s.active_cameras, s.total_cameras))
                    .unwrap_or_else(|| MISSING.into()),
                unit: None,
                icon: "📷",
                variant: match stats {
                    Some(s) if s.active_cameras != s.total_cameras => StatVariant::Warn,
                    _ => StatVariant::Good,
                },
                description: "Cameras currently online",
            },
            StatCard {
                label: "Incidents Today",
                value: stats
                    .map(|s| s.incidents_today.to_string())
                    .unwrap_or_else(|| MISSING.into()),
                unit: None,
                icon: "🚨",
                variant: match stats {
                    Some(s) if s.incidents_today > 0 => StatVariant::Danger,
                    _ => StatVariant::Good,
                },
                description: "Accidents or events detected",
            },
            StatCard {
                label: "Detection Status",
                value: stats
                    .map(|s| s.detection_status.label().to_lowercase())
                    .unwrap_or_else(|| MISSING.into()),
                unit: None,
                icon: "🔍",
                variant: match stats.map(|s| s.detection_status) {
                    Some(DetectionStatus::Active) => StatVariant::Good,
                    Some(DetectionStatus::Degraded) => StatVariant::Warn,
                    _ => StatVariant::Danger,
                },
                description: "YOLO inference engine",
            },
            StatCard {
                label: "System Uptime",
                value: stats
                    .map(|s| s.uptime_percent.to_string())
                    .unwrap_or_else(|| MISSING.into()),
                unit: Some("%"),
                icon: "⏱",
                variant: StatVariant::Good,
                description: "Last 30 days",
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSource;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn load_derives_cards_and_active_banner() {
        let source = FakeSource::populated();
        let mut overview = Overview::new();
        assert!(overview.is_loading());

        overview.load(&source, 5).await;
        assert!(!overview.is_loading());
        assert_eq!(overview.recent().len(), 5);

        let cards = overview.stat_cards();
        assert_eq!(cards[0].value, "2/3");
        assert_eq!(cards[0].variant, StatVariant::Warn);
        assert_eq!(cards[1].variant, StatVariant::Danger);
        assert_eq!(cards[2].value, "degraded");
        assert_eq!(cards[2].variant, StatVariant::Warn);
        assert_eq!(cards[3].unit, Some("%"));

        // INC-000, INC-002 and INC-004 are unresolved.
        let banners = overview.banners();
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].message, "3 active incidents detected");
        assert_eq!(
            banners[0].detail.as_deref(),
            Some("CAM-01 — Collision · CAM-01 — Collision · CAM-01 — Collision")
        );
    }

    #[tokio::test]
    async fn any_failed_fetch_sets_the_error() {
        let source = FakeSource::populated();
        source.fail_stats.store(true, Ordering::SeqCst);
        let mut overview = Overview::new();
        overview.load(&source, 5).await;

        assert!(overview.stats().is_none());
        assert_eq!(overview.error(), Some("GET /stats failed: 502 Bad Gateway"));
        let cards = overview.stat_cards();
        assert!(cards.iter().all(|card| card.value == MISSING));
        assert_eq!(cards[2].variant, StatVariant::Danger);

        let banners = overview.banners();
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].kind, AlertKind::Warning);
    }

    #[tokio::test]
    async fn recent_rows_follow_the_chosen_sort() {
        let source = FakeSource::populated();
        let mut overview = Overview::new();
        overview.load(&source, 5).await;
        assert_eq!(overview.rows().ids().first(), Some(&"INC-000"));

        overview.sort_by(SortKey::Timestamp);
        assert_eq!(
            overview.table().indicator(SortKey::Timestamp),
            roadwatch_table::SortIndicator::Ascending
        );
        assert_eq!(overview.rows().ids().first(), Some(&"INC-004"));
    }

    #[tokio::test]
    async fn dismissed_banners_do_not_return() {
        let source = FakeSource::populated();
        let mut overview = Overview::new();
        overview.load(&source, 1).await;
        assert_eq!(overview.banners()[0].message, "1 active incident detected");

        overview.dismiss_banners();
        assert!(overview.banners().is_empty());
    }
}
