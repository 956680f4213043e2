use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use roadwatch_types::{RoadwatchError, Result};
use serde_json::Value;
use tracing::{debug, info};

/// Key-value store for small JSON preference blobs.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: &Value) -> Result<()>;
}

/// One `<key>.json` file per key under a directory.
pub struct FilePreferenceStore {
    dir: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(prefs_error(format!("invalid preference key {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(prefs_error(format!(
                    "failed to read {}: {err}",
                    path.display()
                )))
            }
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| prefs_error(format!("corrupt preference {key}: {err}")))
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|err| {
            prefs_error(format!("failed to create {}: {err}", self.dir.display()))
        })?;
        let encoded = serde_json::to_string_pretty(value)
            .map_err(|err| prefs_error(format!("failed to encode {key}: {err}")))?;

        // Write beside the target then rename so readers never see a torn file.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, encoded)
            .and_then(|_| fs::rename(&staging, &path))
            .map_err(|err| prefs_error(format!("failed to write {}: {err}", path.display())))?;
        info!("Saved preference {} to {:?}", key, path);
        Ok(())
    }
}

/// Process-local store, used when no directory is configured and in tests.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| prefs_error("failed to lock preference map"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        debug!("Storing preference {} in memory", key);
        self.entries
            .lock()
            .map_err(|_| prefs_error("failed to lock preference map"))?
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}

fn prefs_error(message: impl Into<String>) -> RoadwatchError {
    RoadwatchError::Preferences(message.into())
}
