//! Per-camera frame polling with generation-guarded result application.
//!
//! Each [`PollingController`] owns one fetch-and-apply cycle. Every activation
//! mints a new generation token; a fetch result is written to the observable
//! state only if its token is still current when it resolves. Deactivation
//! bumps the token and disarms the timer, but never aborts a fetch already in
//! flight; that fetch's result is simply dropped on arrival.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use roadwatch_source::DataSource;
use roadwatch_types::{camera::CameraStatus, RoadwatchError, Result};
use tokio::{
    runtime::Handle,
    sync::{oneshot, watch},
    time::{interval_at, Duration, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

mod state;

pub use state::{FeedState, FrameSnapshot};

/// Parameters of one activation.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    pub camera_id: String,
    pub status: CameraStatus,
    /// Zero means fetch once and never repeat.
    pub interval: Duration,
}

impl Activation {
    pub fn new(camera_id: impl Into<String>, status: CameraStatus, interval: Duration) -> Self {
        Self {
            camera_id: camera_id.into(),
            status,
            interval,
        }
    }

    /// Whether this activation arms a repeating timer.
    pub fn repeats(&self) -> bool {
        !self.interval.is_zero() && self.status.is_polled()
    }
}

#[derive(Debug, Default)]
struct Generation {
    current: u64,
    stopped: bool,
}

struct Shared {
    generation: Mutex<Generation>,
    state: watch::Sender<FeedState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Generation> {
        self.generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes `next` only while `generation` is still current. The check and
    /// the write happen under the same lock as deactivation.
    fn apply(&self, generation: u64, next: FeedState) -> bool {
        let guard = self.lock();
        if guard.stopped || guard.current != generation {
            return false;
        }
        self.state.send_replace(next);
        true
    }

    fn stop(&self) -> bool {
        let mut guard = self.lock();
        if guard.stopped {
            return false;
        }
        guard.stopped = true;
        guard.current = guard.current.wrapping_add(1);
        self.state.send_replace(FeedState::Stopped);
        true
    }
}

/// Armed repeating timer. Dropping the handle disarms it.
struct TimerHandle {
    _disarm: oneshot::Sender<()>,
}

/// Keeps one camera's [`FrameSnapshot`] fresh.
pub struct PollingController<S: ?Sized> {
    source: Arc<S>,
    shared: Arc<Shared>,
    timer: Option<TimerHandle>,
    last: Option<Activation>,
}

impl<S> PollingController<S>
where
    S: DataSource + ?Sized + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        let (state, _) = watch::channel(FeedState::Idle);
        Self {
            source,
            shared: Arc::new(Shared {
                generation: Mutex::new(Generation::default()),
                state,
            }),
            timer: None,
            last: None,
        }
    }

    /// Starts a new generation: fetches immediately, then on every interval
    /// tick unless the interval is zero or the camera is offline.
    ///
    /// Must be called from within a Tokio runtime. Returns the new token.
    pub fn activate(
        &mut self,
        camera_id: impl Into<String>,
        status: CameraStatus,
        interval: Duration,
    ) -> Result<u64> {
        self.start(Activation::new(camera_id, status, interval))
    }

    /// Manual re-trigger: re-activates with the last parameters.
    pub fn refresh(&mut self) -> Result<()> {
        if self.is_stopped() {
            return Ok(());
        }
        match self.last.clone() {
            Some(activation) => self.start(activation).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Idempotent. Moves to the terminal `Stopped` state.
    pub fn deactivate(&mut self) {
        if self.shared.stop() {
            if let Some(activation) = &self.last {
                info!(camera_id = %activation.camera_id, "Polling controller deactivated");
            }
        }
        self.timer = None;
    }

    pub fn state(&self) -> FeedState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.shared.state.subscribe()
    }

    pub fn generation(&self) -> u64 {
        self.shared.lock().current
    }

    pub fn timer_armed(&self) -> bool {
        self.timer.is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.lock().stopped
    }

    pub fn activation(&self) -> Option<&Activation> {
        self.last.as_ref()
    }

    fn start(&mut self, activation: Activation) -> Result<u64> {
        let handle = Handle::try_current()
            .map_err(|err| poller_error(format!("no async runtime available: {err}")))?;

        let generation = {
            let mut guard = self.shared.lock();
            if guard.stopped {
                return Err(poller_error(format!(
                    "controller for {} is stopped",
                    activation.camera_id
                )));
            }
            guard.current = guard.current.wrapping_add(1);
            self.shared.state.send_replace(FeedState::Loading);
            guard.current
        };

        // Replacing the handle disarms the previous generation's timer.
        self.timer = None;
        let disarmed = if activation.repeats() {
            let (tx, rx) = oneshot::channel();
            self.timer = Some(TimerHandle { _disarm: tx });
            Some(rx)
        } else {
            None
        };

        info!(
            camera_id = %activation.camera_id,
            generation,
            interval_ms = u64::try_from(activation.interval.as_millis()).unwrap_or(u64::MAX),
            repeating = disarmed.is_some(),
            "Polling controller activated"
        );

        handle.spawn(run_cycle(
            Arc::clone(&self.source),
            Arc::clone(&self.shared),
            activation.clone(),
            generation,
            disarmed,
        ));
        self.last = Some(activation);
        Ok(generation)
    }
}

impl<S: ?Sized> Drop for PollingController<S> {
    fn drop(&mut self) {
        self.shared.stop();
    }
}

async fn run_cycle<S>(
    source: Arc<S>,
    shared: Arc<Shared>,
    activation: Activation,
    generation: u64,
    disarmed: Option<oneshot::Receiver<()>>,
) where
    S: DataSource + ?Sized,
{
    poll_once(source.as_ref(), &shared, &activation.camera_id, generation).await;

    let Some(mut disarmed) = disarmed else {
        return;
    };

    let mut ticker = interval_at(Instant::now() + activation.interval, activation.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut disarmed => {
                debug!(camera_id = %activation.camera_id, generation, "Timer disarmed");
                return;
            }
        }
        if !shared.apply(generation, FeedState::Loading) {
            return;
        }
        poll_once(source.as_ref(), &shared, &activation.camera_id, generation).await;
    }
}

async fn poll_once<S>(source: &S, shared: &Shared, camera_id: &str, generation: u64)
where
    S: DataSource + ?Sized,
{
    let next = match source.fetch_frame(camera_id).await {
        Ok(url) => FeedState::Ready(FrameSnapshot {
            camera_id: camera_id.to_string(),
            url,
            fetched_at: Utc::now(),
        }),
        Err(err) => {
            warn!(camera_id, error = %err, "Frame fetch failed");
            FeedState::Error(err.to_string())
        }
    };
    if !shared.apply(generation, next) {
        debug!(camera_id, generation, "Discarding stale frame result");
    }
}

pub fn poller_error(message: impl Into<String>) -> RoadwatchError {
    RoadwatchError::Poller(message.into())
}
