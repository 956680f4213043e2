use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use roadwatch_ops::PreferenceStore;
use roadwatch_types::settings::{
    Settings, MAX_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS, POLL_INTERVAL_STEP_MS, SETTINGS_KEY,
};
use tracing::{info, warn};

use crate::alerts::{AlertBanner, AlertKind};

/// How long the "saved" confirmation stays up.
pub const SAVED_BANNER_TTL: Duration = Duration::from_secs(3);

const THRESHOLD_STEP: f64 = 0.01;

/// Preference form backed by a key-value store.
pub struct SettingsScreen<P: ?Sized> {
    store: Arc<P>,
    form: Settings,
    saved_at: Option<Instant>,
    error: Option<String>,
}

impl<P> SettingsScreen<P>
where
    P: PreferenceStore + ?Sized,
{
    /// Reads the stored form; unreadable data falls back to defaults.
    pub fn load(store: Arc<P>) -> Self {
        let form = match store.get(SETTINGS_KEY) {
            Ok(Some(stored)) => Settings::from_stored(&stored),
            Ok(None) => Settings::default(),
            Err(err) => {
                warn!(error = %err, "Stored settings unreadable; using defaults");
                Settings::default()
            }
        };
        Self {
            store,
            form,
            saved_at: None,
            error: None,
        }
    }

    pub fn form(&self) -> &Settings {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Settings {
        &mut self.form
    }

    /// Validates and persists the form. Returns whether it was written.
    pub fn save(&mut self, now: Instant) -> bool {
        let written = self
            .form
            .validate()
            .and_then(|_| self.form.to_value())
            .and_then(|value| self.store.set(SETTINGS_KEY, &value));
        match written {
            Ok(()) => {
                info!("Settings saved");
                self.saved_at = Some(now);
                self.error = None;
                true
            }
            Err(err) => {
                warn!(error = %err, "Settings save failed");
                self.saved_at = None;
                self.error = Some(format!("Failed to save settings: {err}"));
                false
            }
        }
    }

    /// Restores defaults in the form only; nothing is written until saved.
    pub fn reset(&mut self) {
        self.form = Settings::default();
    }

    pub fn step_poll_interval(&mut self, steps: i64) {
        let delta = POLL_INTERVAL_STEP_MS.saturating_mul(steps.unsigned_abs());
        let next = if steps >= 0 {
            self.form.poll_interval_ms.saturating_add(delta)
        } else {
            self.form.poll_interval_ms.saturating_sub(delta)
        };
        self.form.poll_interval_ms = next.clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS);
    }

    pub fn step_alert_threshold(&mut self, steps: i32) {
        let next = self.form.alert_threshold + THRESHOLD_STEP * f64::from(steps);
        self.form.alert_threshold = (next.clamp(0.5, 1.0) * 100.0).round() / 100.0;
    }

    pub fn toggle_alerts(&mut self) {
        self.form.enable_alerts = !self.form.enable_alerts;
    }

    pub fn saved_banner_visible(&self, now: Instant) -> bool {
        self.saved_at
            .is_some_and(|saved| now.saturating_duration_since(saved) < SAVED_BANNER_TTL)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn banners(&self, now: Instant) -> Vec<AlertBanner> {
        let mut banners = Vec::new();
        if self.saved_banner_visible(now) {
            banners.push(AlertBanner::new(AlertKind::Info, "Settings saved successfully."));
        }
        if let Some(error) = &self.error {
            banners.push(AlertBanner::new(AlertKind::Warning, error.clone()));
        }
        banners
    }
}
