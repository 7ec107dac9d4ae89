//! Local key/value storage.
//!
//! `LocalStore` plays the part of browser local storage: a flat JSON object
//! on disk, rewritten whole on every write. Concurrent processes are not
//! coordinated; the last write wins.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Key holding the ids of submissions hidden on the instructor dashboard.
pub const DELETED_SUBMISSIONS_KEY: &str = "deletedSubmissions";

/// JSON-object-backed key/value store.
#[derive(Debug)]
pub struct LocalStore {
    path: Option<PathBuf>,
    data: Mutex<Map<String, Value>>,
}

impl LocalStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        let data = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read local store: {}", path.display()))?;
            if content.trim().is_empty() {
                Map::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("failed to parse local store: {}", path.display()))?
            }
        } else {
            Map::new()
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            data: Mutex::new(data),
        })
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: Mutex::new(Map::new()),
        }
    }

    fn data(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read and decode a key. Undecodable values read as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.data().get(key).cloned()?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring malformed local store value");
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("failed to encode local store key '{key}'"))?;
        let mut data = self.data();
        data.insert(key.to_string(), value);
        self.flush(&data)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let mut data = self.data();
        data.remove(key);
        self.flush(&data)
    }

    fn flush(&self, data: &Map<String, Value>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write local store: {}", path.display()))?;
        Ok(())
    }
}

/// Submission ids the instructor removed from view.
///
/// The list is read once when constructed and rewritten on every new id.
#[derive(Debug)]
pub struct DeletedSubmissions {
    store: std::sync::Arc<LocalStore>,
    ids: Mutex<Vec<String>>,
}

impl DeletedSubmissions {
    pub fn load(store: std::sync::Arc<LocalStore>) -> Self {
        let ids: Vec<String> = store.get(DELETED_SUBMISSIONS_KEY).unwrap_or_default();
        Self {
            store,
            ids: Mutex::new(ids),
        }
    }

    fn ids_guard(&self) -> MutexGuard<'_, Vec<String>> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids_guard().iter().any(|i| i == id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids_guard().clone()
    }

    /// Record `id` and persist the list. Returns false if it was already
    /// recorded.
    pub fn insert(&self, id: &str) -> Result<bool> {
        let mut ids = self.ids_guard();
        if ids.iter().any(|i| i == id) {
            return Ok(false);
        }
        ids.push(id.to_string());
        self.store.set(DELETED_SUBMISSIONS_KEY, &*ids)?;
        Ok(true)
    }
}
