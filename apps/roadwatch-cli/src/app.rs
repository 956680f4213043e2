use std::{sync::Arc, time::Instant};

use crossterm::event::KeyCode;
use roadwatch_dashboard::{IncidentsScreen, LiveFeedScreen, Overview, SettingsScreen};
use roadwatch_ops::PreferenceStore;
use roadwatch_source::DataSource;
use roadwatch_table::SortKey;
use roadwatch_types::{config::RoadwatchConfig, settings::Settings, Result};
use tokio::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    LiveFeed,
    Incidents,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::LiveFeed, Tab::Incidents, Tab::Settings];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::LiveFeed => "Live Feed",
            Tab::Incidents => "Incidents",
            Tab::Settings => "Settings",
        }
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|tab| *tab == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }
}

/// Free-text settings fields edited through the line editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    ApiBaseUrl,
    CameraIds,
}

impl TextField {
    fn next(self) -> Self {
        match self {
            TextField::ApiBaseUrl => TextField::CameraIds,
            TextField::CameraIds => TextField::ApiBaseUrl,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TextField::ApiBaseUrl => "API base URL",
            TextField::CameraIds => "Camera IDs",
        }
    }

    fn value(self, form: &Settings) -> &str {
        match self {
            TextField::ApiBaseUrl => &form.api_base_url,
            TextField::CameraIds => &form.camera_ids,
        }
    }

    fn slot(self, form: &mut Settings) -> &mut String {
        match self {
            TextField::ApiBaseUrl => &mut form.api_base_url,
            TextField::CameraIds => &mut form.camera_ids,
        }
    }
}

/// Uncommitted text for one field. The form changes only on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub field: TextField,
    pub buffer: String,
}

pub struct App {
    source: Arc<dyn DataSource>,
    dashboard_limit: usize,
    pub tab: Tab,
    pub overview: Overview,
    pub live: LiveFeedScreen<dyn DataSource>,
    pub incidents: IncidentsScreen,
    pub settings: SettingsScreen<dyn PreferenceStore>,
    pub editing: Option<TextEdit>,
}

impl App {
    pub fn new(
        config: &RoadwatchConfig,
        source: Arc<dyn DataSource>,
        store: Arc<dyn PreferenceStore>,
    ) -> Self {
        let interval = Duration::from_millis(config.feed.poll_interval_ms);
        Self {
            live: LiveFeedScreen::new(Arc::clone(&source), interval),
            source,
            dashboard_limit: config.incidents.dashboard_limit,
            tab: Tab::Dashboard,
            overview: Overview::new(),
            incidents: IncidentsScreen::new(config.incidents.default_limit),
            settings: SettingsScreen::load(store),
            editing: None,
        }
    }

    pub async fn start(&mut self) {
        self.overview
            .load(self.source.as_ref(), self.dashboard_limit)
            .await;
        self.incidents.reload(self.source.as_ref()).await;
    }

    /// Live polling only runs while its tab is shown.
    pub async fn switch_to(&mut self, tab: Tab) -> Result<()> {
        if tab == self.tab {
            return Ok(());
        }
        if self.tab == Tab::LiveFeed {
            self.live.leave();
        }
        info!("Switching to {}", tab.title());
        self.tab = tab;
        if tab == Tab::LiveFeed {
            self.live.load().await?;
        }
        Ok(())
    }

    /// Applies one key press. Returns `false` when the app should exit.
    pub async fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        if self.editing.is_some() {
            self.handle_edit_key(code);
            return Ok(true);
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.live.leave();
                return Ok(false);
            }
            KeyCode::Tab => self.switch_to(self.tab.next()).await?,
            KeyCode::Char('1') => self.switch_to(Tab::Dashboard).await?,
            KeyCode::Char('2') => self.switch_to(Tab::LiveFeed).await?,
            KeyCode::Char('3') => self.switch_to(Tab::Incidents).await?,
            KeyCode::Char('4') => self.switch_to(Tab::Settings).await?,
            KeyCode::Char('d') => self.dismiss_banners(),
            other => self.handle_tab_key(other).await?,
        }
        Ok(true)
    }

    async fn handle_tab_key(&mut self, code: KeyCode) -> Result<()> {
        match (self.tab, code) {
            (Tab::Dashboard, KeyCode::Char('r')) => {
                self.overview
                    .load(self.source.as_ref(), self.dashboard_limit)
                    .await
            }
            (Tab::Dashboard, KeyCode::Char('t')) => self.overview.sort_by(SortKey::Timestamp),
            (Tab::Dashboard, KeyCode::Char('y')) => self.overview.sort_by(SortKey::Kind),
            (Tab::Dashboard, KeyCode::Char('c')) => self.overview.sort_by(SortKey::Confidence),
            (Tab::LiveFeed, KeyCode::Char('i')) => {
                self.live.cycle_interval()?;
            }
            (Tab::LiveFeed, KeyCode::Char('r')) => self.live.refresh_all()?,
            (Tab::Incidents, KeyCode::Char('t')) => self.incidents.sort_by(SortKey::Timestamp),
            (Tab::Incidents, KeyCode::Char('y')) => self.incidents.sort_by(SortKey::Kind),
            (Tab::Incidents, KeyCode::Char('c')) => self.incidents.sort_by(SortKey::Confidence),
            (Tab::Incidents, KeyCode::Char('f')) => self.incidents.cycle_filter(),
            (Tab::Incidents, KeyCode::Char('l')) => {
                let limit = self.incidents.next_limit();
                self.incidents
                    .set_limit(self.source.as_ref(), limit)
                    .await?;
            }
            (Tab::Incidents, KeyCode::Char('r')) => {
                self.incidents.reload(self.source.as_ref()).await
            }
            (Tab::Settings, KeyCode::Char('+')) => self.settings.step_poll_interval(1),
            (Tab::Settings, KeyCode::Char('-')) => self.settings.step_poll_interval(-1),
            (Tab::Settings, KeyCode::Char(']')) => self.settings.step_alert_threshold(1),
            (Tab::Settings, KeyCode::Char('[')) => self.settings.step_alert_threshold(-1),
            (Tab::Settings, KeyCode::Char('a')) => self.settings.toggle_alerts(),
            (Tab::Settings, KeyCode::Char('s')) => {
                self.settings.save(Instant::now());
            }
            (Tab::Settings, KeyCode::Char('x')) => self.settings.reset(),
            (Tab::Settings, KeyCode::Enter) => self.begin_edit(TextField::ApiBaseUrl),
            _ => {}
        }
        Ok(())
    }

    fn begin_edit(&mut self, field: TextField) {
        let buffer = field.value(self.settings.form()).to_string();
        self.editing = Some(TextEdit { field, buffer });
    }

    fn commit_edit(&mut self, edit: TextEdit) {
        *edit.field.slot(self.settings.form_mut()) = edit.buffer;
    }

    /// Enter commits, Tab commits and moves to the other field, Esc discards.
    fn handle_edit_key(&mut self, code: KeyCode) {
        let Some(mut edit) = self.editing.take() else {
            return;
        };
        match code {
            KeyCode::Enter => self.commit_edit(edit),
            KeyCode::Tab => {
                let next = edit.field.next();
                self.commit_edit(edit);
                self.begin_edit(next);
            }
            KeyCode::Esc => {}
            KeyCode::Backspace => {
                edit.buffer.pop();
                self.editing = Some(edit);
            }
            KeyCode::Char(c) => {
                edit.buffer.push(c);
                self.editing = Some(edit);
            }
            _ => self.editing = Some(edit),
        }
    }

    fn dismiss_banners(&mut self) {
        match self.tab {
            Tab::Dashboard => self.overview.dismiss_banners(),
            Tab::LiveFeed => self.live.dismiss_banners(),
            Tab::Incidents => self.incidents.dismiss_banners(),
            Tab::Settings => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadwatch_ops::MemoryPreferenceStore;
    use roadwatch_source::StubSource;
    use roadwatch_table::{FilterMode, SortDirection};

    fn app() -> App {
        app_with_store(Arc::new(MemoryPreferenceStore::new()))
    }

    fn app_with_store(store: Arc<dyn PreferenceStore>) -> App {
        let mut config = RoadwatchConfig::default();
        config.api.stub_latency_ms = 0;
        let source: Arc<dyn DataSource> = Arc::new(StubSource::new(&config.api));
        App::new(&config, source, store)
    }

    async fn press(app: &mut App, keys: impl IntoIterator<Item = KeyCode>) {
        for key in keys {
            app.handle_key(key).await.expect("key");
        }
    }

    async fn type_text(app: &mut App, text: &str) {
        press(app, text.chars().map(KeyCode::Char)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn live_feed_runs_only_while_shown() {
        let mut app = app();
        app.start().await;
        assert!(app.live.tiles().is_empty());

        assert!(app.handle_key(KeyCode::Char('2')).await.expect("key"));
        assert_eq!(app.tab, Tab::LiveFeed);
        assert_eq!(app.live.tiles().len(), 4);

        app.handle_key(KeyCode::Tab).await.expect("key");
        assert_eq!(app.tab, Tab::Incidents);
        assert!(app.live.tiles().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn incident_keys_drive_the_table() {
        let mut app = app();
        app.start().await;
        app.handle_key(KeyCode::Char('3')).await.expect("key");

        app.handle_key(KeyCode::Char('c')).await.expect("key");
        let order = app.incidents.table().sort_spec();
        assert_eq!(order.key, SortKey::Confidence);
        assert_eq!(order.direction, SortDirection::Descending);
        assert_eq!(app.incidents.rows().ids().first(), Some(&"INC-004"));

        app.handle_key(KeyCode::Char('f')).await.expect("key");
        assert_eq!(app.incidents.table().filter(), FilterMode::Active);
        assert_eq!(app.incidents.counts().shown, 1);

        app.handle_key(KeyCode::Char('l')).await.expect("key");
        assert_eq!(app.incidents.limit(), 50);
    }

    #[tokio::test(start_paused = true)]
    async fn quit_stops_the_app() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Char('q')).await.expect("key"));
    }

    #[tokio::test(start_paused = true)]
    async fn settings_keys_edit_the_form() {
        let mut app = app();
        app.handle_key(KeyCode::Char('4')).await.expect("key");
        app.handle_key(KeyCode::Char('+')).await.expect("key");
        app.handle_key(KeyCode::Char('a')).await.expect("key");
        assert_eq!(app.settings.form().poll_interval_ms, 5500);
        assert!(!app.settings.form().enable_alerts);

        app.handle_key(KeyCode::Char('x')).await.expect("key");
        assert_eq!(app.settings.form().poll_interval_ms, 5000);
    }

    #[tokio::test(start_paused = true)]
    async fn camera_ids_edit_is_saved_and_reloaded() {
        let store: Arc<dyn PreferenceStore> = Arc::new(MemoryPreferenceStore::new());
        let mut app = app_with_store(Arc::clone(&store));
        press(&mut app, [KeyCode::Char('4'), KeyCode::Enter, KeyCode::Tab]).await;
        assert_eq!(
            app.editing.as_ref().map(|edit| edit.field),
            Some(TextField::CameraIds)
        );

        let existing = app.settings.form().camera_ids.len();
        press(&mut app, std::iter::repeat(KeyCode::Backspace).take(existing)).await;
        // Keys that normally quit or save are plain text while editing.
        type_text(&mut app, "CAM-09, q, s").await;
        press(&mut app, [KeyCode::Enter, KeyCode::Char('s')]).await;
        assert!(app.editing.is_none());

        let reloaded = SettingsScreen::load(store);
        assert_eq!(reloaded.form().camera_id_list(), vec!["CAM-09", "q", "s"]);
        assert_eq!(reloaded.form().api_base_url, "http://localhost:8000");
    }

    #[tokio::test(start_paused = true)]
    async fn escape_discards_an_edit() {
        let mut app = app();
        press(&mut app, [KeyCode::Char('4'), KeyCode::Enter]).await;
        type_text(&mut app, "/v2").await;
        assert_eq!(
            app.editing.as_ref().map(|edit| edit.buffer.as_str()),
            Some("http://localhost:8000/v2")
        );

        press(&mut app, [KeyCode::Esc]).await;
        assert!(app.editing.is_none());
        assert_eq!(app.settings.form().api_base_url, "http://localhost:8000");
        assert_eq!(app.tab, Tab::Settings);
    }
}
