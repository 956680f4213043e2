use roadwatch_source::DataSource;
use roadwatch_table::{DerivedRows, FilterMode, IncidentCounts, SortKey, TableViewModel};
use roadwatch_types::{incident::IncidentRecord, RoadwatchError, Result};
use tracing::{info, warn};

use crate::alerts::{AlertBanner, AlertKind, BannerShelf};

pub const LIMIT_OPTIONS: [usize; 4] = [10, 20, 50, 100];

/// Full incident list with filter buttons, sortable columns and a page size.
#[derive(Debug)]
pub struct IncidentsScreen {
    limit: usize,
    incidents: Vec<IncidentRecord>,
    table: TableViewModel,
    loading: bool,
    error: Option<String>,
    shelf: BannerShelf,
}

impl IncidentsScreen {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            incidents: Vec::new(),
            table: TableViewModel::new(),
            loading: true,
            error: None,
            shelf: BannerShelf::default(),
        }
    }

    /// Refetches at the current limit. On failure the previous rows stay.
    pub async fn reload<S>(&mut self, source: &S)
    where
        S: DataSource + ?Sized,
    {
        self.loading = true;
        match source.fetch_incidents(self.limit).await {
            Ok(incidents) => {
                info!("Loaded {} incidents (limit {})", incidents.len(), self.limit);
                self.incidents = incidents;
                self.error = None;
            }
            Err(err) => {
                warn!(error = %err, "Incident load failed");
                self.error = Some(err.to_string());
            }
        }
        self.loading = false;
    }

    /// Accepts only the offered page sizes, then reloads.
    pub async fn set_limit<S>(&mut self, source: &S, limit: usize) -> Result<()>
    where
        S: DataSource + ?Sized,
    {
        if !LIMIT_OPTIONS.contains(&limit) {
            return Err(RoadwatchError::InvalidSetting(format!(
                "incident limit {limit} is not one of {LIMIT_OPTIONS:?}"
            )));
        }
        self.limit = limit;
        self.reload(source).await;
        Ok(())
    }

    /// Next offered page size after the current one, wrapping around.
    pub fn next_limit(&self) -> usize {
        LIMIT_OPTIONS
            .iter()
            .position(|&option| option == self.limit)
            .map(|idx| LIMIT_OPTIONS[(idx + 1) % LIMIT_OPTIONS.len()])
            .unwrap_or(LIMIT_OPTIONS[0])
    }

    pub fn sort_by(&mut self, key: SortKey) {
        self.table.set_sort(key);
    }

    pub fn set_filter(&mut self, mode: FilterMode) {
        self.table.set_filter(mode);
    }

    pub fn cycle_filter(&mut self) {
        self.table.set_filter(self.table.filter().next());
    }

    pub fn table(&self) -> &TableViewModel {
        &self.table
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn rows(&self) -> DerivedRows<'_> {
        self.table.view(&self.incidents)
    }

    pub fn counts(&self) -> IncidentCounts {
        self.table.counts(&self.incidents)
    }

    pub fn banners(&self) -> Vec<AlertBanner> {
        let banners = self
            .error
            .iter()
            .map(|error| {
                AlertBanner::new(AlertKind::Warning, "Failed to load incidents")
                    .with_detail(error.clone())
            })
            .collect();
        self.shelf.visible(banners)
    }

    pub fn dismiss_banners(&mut self) {
        let visible = self.banners();
        self.shelf.dismiss_all(&visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSource;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn reload_respects_limit_and_filter() {
        let source = FakeSource::populated();
        let mut screen = IncidentsScreen::new(10);
        assert!(screen.is_loading());
        screen.reload(&source).await;
        assert!(!screen.is_loading());

        assert_eq!(screen.counts().total, 10);
        screen.set_filter(FilterMode::Resolved);
        let counts = screen.counts();
        assert_eq!(counts.shown, 5);
        assert_eq!(screen.rows().len(), 5);
        assert!(screen.rows().iter().all(|incident| incident.resolved));
    }

    #[tokio::test]
    async fn rows_default_to_newest_first() {
        let source = FakeSource::populated();
        let mut screen = IncidentsScreen::new(10);
        screen.reload(&source).await;
        let ids = screen.rows().ids();
        assert_eq!(ids.first(), Some(&"INC-000"));

        screen.sort_by(SortKey::Timestamp);
        assert_eq!(screen.rows().ids().first(), Some(&"INC-009"));
    }

    #[tokio::test]
    async fn limit_changes_reload_and_unknown_limits_are_rejected() {
        let source = FakeSource::populated();
        let mut screen = IncidentsScreen::new(10);
        screen.reload(&source).await;

        screen.set_limit(&source, 20).await.expect("valid limit");
        assert_eq!(screen.counts().total, 12);
        assert_eq!(source.incident_calls.load(Ordering::SeqCst), 2);

        assert!(screen.set_limit(&source, 7).await.is_err());
        assert_eq!(screen.limit(), 20);
        assert_eq!(screen.next_limit(), 50);
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_rows() {
        let source = FakeSource::populated();
        let mut screen = IncidentsScreen::new(10);
        screen.reload(&source).await;

        source.fail_incidents.store(true, Ordering::SeqCst);
        screen.reload(&source).await;
        assert_eq!(screen.counts().total, 10);
        let banners = screen.banners();
        assert_eq!(banners[0].message, "Failed to load incidents");
    }

    #[test]
    fn filter_cycles_through_modes() {
        let mut screen = IncidentsScreen::new(20);
        screen.cycle_filter();
        assert_eq!(screen.table().filter(), FilterMode::Active);
        screen.cycle_filter();
        screen.cycle_filter();
        assert_eq!(screen.table().filter(), FilterMode::All);
    }
}
