use std::sync::Arc;

use roadwatch_poller::{FeedState, PollingController};
use roadwatch_source::DataSource;
use roadwatch_types::{
    camera::{CameraFeed, CameraSummary},
    Result,
};
use tokio::{sync::watch, time::Duration};
use tracing::{info, warn};

use crate::alerts::{AlertBanner, AlertKind, BannerShelf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervalOption {
    pub interval: Duration,
    pub label: &'static str,
}

pub const POLL_INTERVAL_OPTIONS: [PollIntervalOption; 5] = [
    PollIntervalOption {
        interval: Duration::from_secs(2),
        label: "2s",
    },
    PollIntervalOption {
        interval: Duration::from_secs(5),
        label: "5s",
    },
    PollIntervalOption {
        interval: Duration::from_secs(10),
        label: "10s",
    },
    PollIntervalOption {
        interval: Duration::from_secs(30),
        label: "30s",
    },
    PollIntervalOption {
        interval: Duration::ZERO,
        label: "Manual",
    },
];

/// One camera card: the feed record and the controller keeping it fresh.
pub struct CameraTile<S: ?Sized> {
    pub camera: CameraFeed,
    controller: PollingController<S>,
}

impl<S> CameraTile<S>
where
    S: DataSource + ?Sized + 'static,
{
    pub fn state(&self) -> FeedState {
        self.controller.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.controller.subscribe()
    }
}

/// Grid of live camera feeds sharing one refresh interval.
pub struct LiveFeedScreen<S: ?Sized> {
    source: Arc<S>,
    interval: Duration,
    tiles: Vec<CameraTile<S>>,
    error: Option<String>,
    loaded: bool,
    shelf: BannerShelf,
}

impl<S> LiveFeedScreen<S>
where
    S: DataSource + ?Sized + 'static,
{
    pub fn new(source: Arc<S>, interval: Duration) -> Self {
        Self {
            source,
            interval,
            tiles: Vec::new(),
            error: None,
            loaded: false,
            shelf: BannerShelf::default(),
        }
    }

    /// Loads the camera list and starts one controller per camera. A list
    /// failure is kept as the screen error; controller failures propagate.
    pub async fn load(&mut self) -> Result<()> {
        let cameras = self.source.fetch_camera_list().await;
        self.loaded = true;
        let cameras = match cameras {
            Ok(cameras) => cameras,
            Err(err) => {
                warn!(error = %err, "Camera list load failed");
                self.error = Some(err.to_string());
                return Ok(());
            }
        };
        self.error = None;
        self.leave();

        let mut tiles = Vec::with_capacity(cameras.len());
        for camera in cameras {
            let mut controller = PollingController::new(Arc::clone(&self.source));
            controller.activate(camera.id.clone(), camera.status, self.interval)?;
            tiles.push(CameraTile { camera, controller });
        }
        info!("Live feed showing {} cameras", tiles.len());
        self.tiles = tiles;
        Ok(())
    }

    /// Changing the interval re-activates every controller.
    pub fn set_interval(&mut self, interval: Duration) -> Result<()> {
        if interval == self.interval {
            return Ok(());
        }
        self.interval = interval;
        for tile in &mut self.tiles {
            tile.controller
                .activate(tile.camera.id.clone(), tile.camera.status, interval)?;
        }
        Ok(())
    }

    /// Advances to the next interval option, wrapping around.
    pub fn cycle_interval(&mut self) -> Result<Duration> {
        let position = POLL_INTERVAL_OPTIONS
            .iter()
            .position(|option| option.interval == self.interval);
        let next = match position {
            Some(idx) => POLL_INTERVAL_OPTIONS[(idx + 1) % POLL_INTERVAL_OPTIONS.len()],
            None => POLL_INTERVAL_OPTIONS[0],
        };
        self.set_interval(next.interval)?;
        Ok(next.interval)
    }

    pub fn refresh_all(&mut self) -> Result<()> {
        for tile in &mut self.tiles {
            tile.controller.refresh()?;
        }
        Ok(())
    }

    /// Stops every controller; further results are discarded.
    pub fn leave(&mut self) {
        for tile in &mut self.tiles {
            tile.controller.deactivate();
        }
        self.tiles.clear();
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn interval_label(&self) -> String {
        POLL_INTERVAL_OPTIONS
            .iter()
            .find(|option| option.interval == self.interval)
            .map(|option| option.label.to_string())
            .unwrap_or_else(|| format!("{}ms", self.interval.as_millis()))
    }

    pub fn tiles(&self) -> &[CameraTile<S>] {
        &self.tiles
    }

    pub fn is_loading(&self) -> bool {
        !self.loaded
    }

    pub fn summary(&self) -> CameraSummary {
        CameraSummary::from_feeds(self.tiles.iter().map(|tile| &tile.camera))
    }

    pub fn banners(&self) -> Vec<AlertBanner> {
        let banners = self
            .error
            .iter()
            .map(|error| {
                AlertBanner::new(AlertKind::Warning, "Could not load camera list")
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
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn load_starts_one_controller_per_camera() {
        let source = Arc::new(FakeSource::populated());
        let mut screen = LiveFeedScreen::new(Arc::clone(&source), Duration::from_secs(5));
        assert!(screen.is_loading());
        screen.load().await.expect("load");

        assert_eq!(screen.tiles().len(), 3);
        assert_eq!(
            screen.summary(),
            CameraSummary {
                online: 1,
                warning: 1,
                offline: 1
            }
        );

        sleep(Duration::from_millis(100)).await;
        assert!(screen.tiles().iter().all(|tile| tile.state().is_settled()));
        assert_eq!(source.frame_calls.load(Ordering::SeqCst), 3);

        // Two polled cameras tick twice; the offline one stays quiet.
        sleep(Duration::from_secs(10)).await;
        assert_eq!(source.frame_calls.load(Ordering::SeqCst), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_interval_stops_repeat_fetches() {
        let source = Arc::new(FakeSource::populated());
        let mut screen = LiveFeedScreen::new(Arc::clone(&source), Duration::from_secs(30));
        screen.load().await.expect("load");
        sleep(Duration::from_millis(100)).await;

        assert_eq!(screen.cycle_interval().expect("cycle"), Duration::ZERO);
        assert_eq!(screen.interval_label(), "Manual");
        sleep(Duration::from_secs(120)).await;
        // Initial fetch plus one re-activation fetch per camera.
        assert_eq!(source.frame_calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_stops_all_polling() {
        let source = Arc::new(FakeSource::populated());
        let mut screen = LiveFeedScreen::new(Arc::clone(&source), Duration::from_secs(2));
        screen.load().await.expect("load");
        let receivers: Vec<_> = screen.tiles().iter().map(CameraTile::subscribe).collect();
        sleep(Duration::from_millis(100)).await;

        screen.leave();
        let after_leave = source.frame_calls.load(Ordering::SeqCst);
        sleep(Duration::from_secs(20)).await;
        assert_eq!(source.frame_calls.load(Ordering::SeqCst), after_leave);
        assert!(receivers
            .iter()
            .all(|rx| *rx.borrow() == FeedState::Stopped));
    }

    #[tokio::test]
    async fn camera_list_failure_becomes_banner() {
        let source = Arc::new(FakeSource::populated());
        source.fail_cameras.store(true, Ordering::SeqCst);
        let mut screen = LiveFeedScreen::new(source, Duration::from_secs(5));
        screen.load().await.expect("load");

        assert!(screen.tiles().is_empty());
        let banners = screen.banners();
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].message, "Could not load camera list");
        assert_eq!(
            banners[0].detail.as_deref(),
            Some("GET /cameras failed: 503 Service Unavailable")
        );
    }
}
