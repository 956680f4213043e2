//! Operational helpers: logging setup and local preference persistence.

use std::{fs::OpenOptions, sync::Mutex};

use roadwatch_types::{config::OpsConfig, RoadwatchError, Result};
use tracing_subscriber::{fmt, EnvFilter};

mod prefs;

pub use prefs::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};

/// Installs the global subscriber. With `log_file` set, output goes to that
/// file (appending, no colours) so it does not interleave with the terminal UI.
pub fn init_tracing(config: &OpsConfig) -> Result<()> {
    let filter = EnvFilter::try_new(config.log_level.clone())
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| RoadwatchError::Ops(format!("failed to create log filter: {err}")))?;

    let builder = fmt().with_env_filter(filter);
    let installed = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| {
                    RoadwatchError::Ops(format!("failed to open log file {path}: {err}"))
                })?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|err| RoadwatchError::Ops(format!("tracing init error: {err}")))?;
    Ok(())
}
