//! Persisted client state
//!
//! A small key/value surface in the spirit of browser local storage. Values
//! are opaque strings; callers serialize structured data themselves.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use crate::error::{AppError, AppResult};

pub const STORAGE_FILE: &str = "session.json";

/// String key/value storage that survives process restarts
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Write every entry or none of them
    fn set_all(&self, entries: &[(&str, &str)]) -> AppResult<()>;

    /// Remove the keys; missing keys are not an error
    fn remove_all(&self, keys: &[&str]) -> AppResult<()>;
}

/// Stores all keys in one JSON document under a directory
///
/// Writes go to a temporary file that is renamed over the document, so a
/// multi-key update is never observed half-applied.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            path: dir.as_ref().join(STORAGE_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> AppResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| {
            AppError::MalformedSession(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Like `read_entries`, but an unparsable document reads as empty so the
    /// next write replaces it. I/O failures still propagate.
    fn read_entries_for_write(&self) -> AppResult<BTreeMap<String, String>> {
        match self.read_entries() {
            Err(AppError::MalformedSession(reason)) => {
                warn!("Discarding unreadable session document: {}", reason);
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let _guard = self.lock.lock()?;
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> AppResult<()> {
        let _guard = self.lock.lock()?;
        let mut current = self.read_entries_for_write()?;
        for (key, value) in entries {
            current.insert(key.to_string(), value.to_string());
        }
        self.write_entries(&current)
    }

    fn remove_all(&self, keys: &[&str]) -> AppResult<()> {
        let _guard = self.lock.lock()?;
        let mut current = self.read_entries_for_write()?;
        for key in keys {
            current.remove(*key);
        }
        self.write_entries(&current)
    }
}

/// In-process store, used by tests and one-shot runs
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let map = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.lock()?.get(key).cloned())
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> AppResult<()> {
        let mut map = self.entries.lock()?;
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> AppResult<()> {
        let mut map = self.entries.lock()?;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}
