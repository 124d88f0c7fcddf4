use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::Context as _;

use crate::{
    config::settings::{AppSettings, CONFIG_VERSION, VisualAdjustments, merge_with_defaults},
    foundation::error::{BoothError, BoothResult},
};

/// Storage key of the camera adjustments record.
pub const CAMERA_SETTINGS_KEY: &str = "photobooth-camera-settings";
/// Storage key of the application settings record.
pub const APP_SETTINGS_KEY: &str = "photobooth-app-settings";

/// Plain key-value record storage owned by the hosting shell.
pub trait SettingsStore: Send + Sync {
    /// Raw stored record for `key`, if present.
    fn get(&self, key: &str) -> BoothResult<Option<String>>;
    /// Store `value` under `key`, replacing any previous record.
    fn set(&self, key: &str, value: &str) -> BoothResult<()>;
    /// Delete the record for `key`; deleting a missing key is not an error.
    fn remove(&self, key: &str) -> BoothResult<()>;
}

/// Stores each record as `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Store rooted at `dir` (created lazily on first write).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> BoothResult<PathBuf> {
        if key.is_empty()
            || key
                .chars()
                .any(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        {
            return Err(BoothError::validation(format!(
                "settings key \"{key}\" must be non-empty [A-Za-z0-9_-]"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SettingsStore for JsonDirStore {
    fn get(&self, key: &str) -> BoothResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("read settings '{}'", path.display()))
                .into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> BoothResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create settings dir '{}'", self.dir.display()))?;
        std::fs::write(&path, value)
            .with_context(|| format!("write settings '{}'", path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> BoothResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("remove settings '{}'", path.display()))
                .into()),
        }
    }
}

/// Process-local store, used by tests and by shells without durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> BoothResult<Option<String>> {
        Ok(self.records().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> BoothResult<()> {
        self.records().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> BoothResult<()> {
        self.records().remove(key);
        Ok(())
    }
}

// Stored `version` when it is ahead of `CONFIG_VERSION`.
fn newer_version(stored: &serde_json::Value) -> Option<u64> {
    stored
        .get("version")
        .and_then(serde_json::Value::as_u64)
        .filter(|v| *v > u64::from(CONFIG_VERSION))
}

fn load_record<T>(store: &dyn SettingsStore, key: &str) -> T
where
    T: Default + serde::Serialize + serde::de::DeserializeOwned,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(err) => {
            tracing::warn!(key, %err, "failed to read settings record");
            return T::default();
        }
    };
    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(stored) => {
            if let Some(version) = newer_version(&stored) {
                tracing::warn!(
                    key,
                    stored = version,
                    current = CONFIG_VERSION,
                    "settings record is newer than this build, reading known fields"
                );
            }
            merge_with_defaults(T::default(), stored)
        }
        Err(err) => {
            tracing::warn!(key, %err, "settings record is not valid JSON");
            T::default()
        }
    }
}

fn save_record<T: serde::Serialize>(
    store: &dyn SettingsStore,
    key: &str,
    value: &T,
) -> BoothResult<()> {
    let raw = serde_json::to_string_pretty(value).map_err(|e| BoothError::serde(e.to_string()))?;
    store.set(key, &raw)
}

/// Load camera adjustments; never fails (missing or bad records yield defaults).
pub fn load_camera_settings(store: &dyn SettingsStore) -> VisualAdjustments {
    load_record(store, CAMERA_SETTINGS_KEY)
}

/// Persist camera adjustments.
pub fn save_camera_settings(
    store: &dyn SettingsStore,
    settings: &VisualAdjustments,
) -> BoothResult<()> {
    save_record(store, CAMERA_SETTINGS_KEY, settings)
}

/// Drop the stored camera record and return the defaults.
pub fn reset_camera_settings(store: &dyn SettingsStore) -> BoothResult<VisualAdjustments> {
    store.remove(CAMERA_SETTINGS_KEY)?;
    Ok(VisualAdjustments::default())
}

/// Load application settings; never fails (missing or bad records yield defaults).
pub fn load_app_settings(store: &dyn SettingsStore) -> AppSettings {
    load_record(store, APP_SETTINGS_KEY)
}

/// Persist application settings.
pub fn save_app_settings(store: &dyn SettingsStore, settings: &AppSettings) -> BoothResult<()> {
    save_record(store, APP_SETTINGS_KEY, settings)
}

/// Drop the stored application record and return the defaults.
pub fn reset_app_settings(store: &dyn SettingsStore) -> BoothResult<AppSettings> {
    store.remove(APP_SETTINGS_KEY)?;
    Ok(AppSettings::default())
}

#[cfg(test)]
#[path = "../../tests/unit/config/store.rs"]
mod tests;
