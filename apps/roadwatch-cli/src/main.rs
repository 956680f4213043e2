use std::{env, path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use roadwatch_dashboard::{IncidentsScreen, LiveFeedScreen, Overview};
use roadwatch_ops::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
use roadwatch_poller::FeedState;
use roadwatch_source::{DataSource, StubSource};
use roadwatch_types::config::RoadwatchConfig;
use serde_json::json;
use tokio::time::{timeout, Duration};
use tracing::{info, warn};

mod app;
mod ui;

const UI_TICK: Duration = Duration::from_millis(100);
const SNAPSHOT_SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Parser)]
#[command(name = "roadwatch", version, about = "Traffic accident detection dashboard")]
struct Cli {
    /// Path to a TOML config; falls back to ROADWATCH_CONFIG, then configs/dev.toml.
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Keep preferences in memory only.
    #[arg(long)]
    ephemeral: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Interactive terminal dashboard (default).
    Tui,
    /// Load every screen once and print the result as JSON.
    Snapshot,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config);
    let command = cli.command.unwrap_or(Command::Tui);
    if matches!(command, Command::Snapshot) {
        config.ops.log_file = None;
    }
    roadwatch_ops::init_tracing(&config.ops)?;

    let source: Arc<dyn DataSource> = Arc::new(StubSource::new(&config.api));
    let store: Arc<dyn PreferenceStore> = if cli.ephemeral {
        Arc::new(MemoryPreferenceStore::new())
    } else {
        Arc::new(FilePreferenceStore::new(&config.ops.prefs_dir))
    };

    match command {
        Command::Tui => {
            let mut app = app::App::new(&config, source, store);
            app.start().await;
            info!("Starting terminal dashboard");
            ui::run(&mut app, UI_TICK).await?;
            info!("Terminal dashboard closed");
        }
        Command::Snapshot => snapshot(&config, source).await?,
    }
    Ok(())
}

async fn snapshot(config: &RoadwatchConfig, source: Arc<dyn DataSource>) -> Result<()> {
    let mut overview = Overview::new();
    overview
        .load(source.as_ref(), config.incidents.dashboard_limit)
        .await;

    let mut incidents = IncidentsScreen::new(config.incidents.default_limit);
    incidents.reload(source.as_ref()).await;

    let mut live = LiveFeedScreen::new(Arc::clone(&source), Duration::ZERO);
    live.load().await?;
    for tile in live.tiles() {
        let mut rx = tile.subscribe();
        if timeout(SNAPSHOT_SETTLE_TIMEOUT, rx.wait_for(FeedState::is_settled))
            .await
            .is_err()
        {
            warn!("Camera {} did not settle before the snapshot", tile.camera.id);
        }
    }
    let feeds: Vec<_> = live
        .tiles()
        .iter()
        .map(|tile| json!({ "camera": tile.camera, "feed": tile.state() }))
        .collect();
    let camera_summary = live.summary();
    let mut alerts = overview.banners();
    alerts.extend(live.banners());
    alerts.extend(incidents.banners());
    live.leave();

    let report = json!({
        "stats": overview.stats(),
        "statCards": overview.stat_cards(),
        "recentIncidents": overview.rows().to_owned_records(),
        "incidents": incidents.rows().to_owned_records(),
        "counts": incidents.counts(),
        "cameraSummary": camera_summary,
        "feeds": feeds,
        "alerts": alerts,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load_config(from_args: Option<PathBuf>) -> RoadwatchConfig {
    let from_env = env::var("ROADWATCH_CONFIG").ok().map(PathBuf::from);
    let path = from_args
        .or(from_env)
        .unwrap_or_else(|| PathBuf::from("configs/dev.toml"));
    match RoadwatchConfig::from_file(&path) {
        Ok(cfg) => {
            if let Err(err) = cfg.validate() {
                eprintln!(
                    "Invalid config in '{}': {err}. Falling back to internal defaults.",
                    path.display()
                );
                default_config()
            } else {
                cfg
            }
        }
        Err(err) => {
            eprintln!(
                "Failed to load config from '{}': {err}. Falling back to internal defaults.",
                path.display()
            );
            default_config()
        }
    }
}

fn default_config() -> RoadwatchConfig {
    let config = RoadwatchConfig::default();
    debug_assert!(config.validate().is_ok());
    config
}
