use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::category::Category;
use crate::models::expense::Expense;
use crate::models::settings::Settings;

use super::format::StorageKey;
use super::traits::StorageBackend;

/// Quota assumed when reporting usage: local key/value stores typically cap
/// at 5-10 MiB, so usage is reported against the low end.
pub const ESTIMATED_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

const PROBE_KEY: &str = "__storage_test__";
const TMP_SUFFIX: &str = "tmp";

/// Bytes used by this store relative to the estimated quota.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageInfo {
    pub used: u64,
    pub available: u64,
    pub percentage: f64,
}

/// Key/value storage backed by one JSON file per key in a directory.
///
/// Reads are forgiving: a missing, unreadable, or corrupt file yields an empty
/// collection rather than an error. Writes replace the file atomically and do
/// report failures.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    root: PathBuf,
}

impl JsonFileStorage {
    /// Use `root` as the storage directory, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            CoreError::FileIO(format!(
                "Failed to create storage directory {}: {e}",
                root.display()
            ))
        })?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding the value of `key`.
    #[must_use]
    pub fn key_path(&self, key: StorageKey) -> PathBuf {
        self.path_for(key.as_str())
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    fn read_key<T: DeserializeOwned + Default>(&self, key: StorageKey) -> T {
        let path = self.key_path(key);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
            Err(e) => {
                warn!(
                    key = key.as_str(),
                    error = %e,
                    "Failed to read local storage key, using empty value"
                );
                return T::default();
            }
        };
        if data.trim().is_empty() {
            return T::default();
        }
        match serde_json::from_str(&data) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    key = key.as_str(),
                    error = %e,
                    "Corrupt local storage value, using empty value"
                );
                T::default()
            }
        }
    }

    fn write_key<T: Serialize + ?Sized>(
        &self,
        key: StorageKey,
        value: &T,
        what: &str,
    ) -> Result<(), CoreError> {
        let data = serde_json::to_string(value).map_err(|e| {
            CoreError::Storage(format!("Failed to save {what} to local storage: {e}"))
        })?;
        write_atomic(&self.key_path(key), &data).map_err(|e| {
            CoreError::Storage(format!("Failed to save {what} to local storage: {e}"))
        })?;
        debug!(key = key.as_str(), bytes = data.len(), "Local storage key written");
        Ok(())
    }

    /// Stored display settings, or defaults.
    pub fn get_settings(&self) -> Settings {
        self.read_key(StorageKey::Settings)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), CoreError> {
        self.write_key(StorageKey::Settings, settings, "settings")
    }

    /// Whether the directory accepts writes right now.
    #[must_use]
    pub fn is_available(&self) -> bool {
        let probe = self.path_for(PROBE_KEY);
        let ok = fs::write(&probe, "test").is_ok();
        let _ = fs::remove_file(&probe);
        ok
    }

    /// Bytes used across all keys, measured against `ESTIMATED_QUOTA_BYTES`.
    #[must_use]
    pub fn storage_info(&self) -> StorageInfo {
        let used: u64 = StorageKey::ALL
            .iter()
            .filter_map(|key| fs::metadata(self.key_path(*key)).ok())
            .map(|meta| meta.len())
            .sum();
        let available = ESTIMATED_QUOTA_BYTES;
        StorageInfo {
            used,
            available,
            percentage: (used as f64 / available as f64) * 100.0,
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl StorageBackend for JsonFileStorage {
    fn name(&self) -> &str {
        "local storage"
    }

    async fn get_expenses(&self) -> Result<Vec<Expense>, CoreError> {
        Ok(self.read_key(StorageKey::Expenses))
    }

    async fn save_expenses(&self, expenses: &[Expense]) -> Result<(), CoreError> {
        self.write_key(StorageKey::Expenses, expenses, "expenses")
    }

    async fn get_categories(&self) -> Result<Vec<Category>, CoreError> {
        Ok(self.read_key(StorageKey::Categories))
    }

    async fn save_categories(&self, categories: &[Category]) -> Result<(), CoreError> {
        self.write_key(StorageKey::Categories, categories, "categories")
    }

    async fn clear_all(&self) -> Result<(), CoreError> {
        for key in StorageKey::ALL {
            match fs::remove_file(self.key_path(key)) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(CoreError::Storage(format!(
                        "Failed to clear local storage key '{}': {e}",
                        key.as_str()
                    )))
                }
            }
        }
        Ok(())
    }
}

/// Write to a sibling temp file, then rename over the target.
fn write_atomic(path: &Path, data: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension(format!("json.{TMP_SUFFIX}"));
    let result = fs::File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(data.as_bytes())?;
            file.flush()
        })
        .and_then(|()| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
