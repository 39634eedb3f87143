//! Durable local key-value storage.
//!
//! SYSTEM CONTEXT
//! ==============
//! Stands in for browser `localStorage`: the session keeps the last known user
//! id here so restoration on the next start can skip a cold sign-in, and the
//! auth adapter caches its refresh credential under its own key.
//!
//! TRADE-OFFS
//! ==========
//! `FileStorage` rewrites the whole JSON map on every mutation. The map holds a
//! handful of short strings, so simplicity wins over incremental writes.
//! Each rewrite goes to a `.tmp` sibling (mode 0600 on unix) and is renamed
//! into place.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Errors produced by local storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed for {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("storage file {path} is not valid JSON: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Synchronous string key-value storage that survives process restarts.
pub trait LocalStorage: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// FILE STORAGE
// =============================================================================

/// JSON-file backed storage. The file is created on first write.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(StorageError::Io { path: self.path.clone(), source }),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StorageError::Parse { path: self.path.clone(), source })
    }

    fn save(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StorageError::Io { path: parent.to_path_buf(), source })?;
            }
        }
        let raw = serde_json::to_string_pretty(map)
            .map_err(|source| StorageError::Parse { path: self.path.clone(), source })?;

        // Write beside the target, then rename, so a crash never leaves a
        // truncated map behind.
        let tmp = self.tmp_path();
        write_private(&tmp, raw.as_bytes()).map_err(|source| StorageError::Io { path: tmp.clone(), source })?;
        fs::rename(&tmp, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            StorageError::Io { path: self.path.clone(), source }
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn mutate(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut map = self.load()?;
        if f(&mut map) {
            self.save(&map)?;
        }
        Ok(())
    }
}

/// Create or replace `path` readable by the owner only. The map holds the
/// auth provider's refresh credential.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        // `mode` only applies on creation; tighten a stale leftover too.
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
        file.write_all(contents)?;
        file.sync_all()
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents)
    }
}

impl LocalStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.mutate(|map| {
            map.insert(key.to_owned(), value.to_owned());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.mutate(|map| map.remove(key).is_some())
    }
}

// =============================================================================
// MEMORY STORAGE
// =============================================================================

/// Process-local storage; contents vanish on exit.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// JSON HELPERS
// =============================================================================

/// Load a JSON value stored under `key`. Missing or malformed values yield `None`.
pub fn load_json<T: serde::de::DeserializeOwned>(storage: &dyn LocalStorage, key: &str) -> Option<T> {
    let raw = storage.get(key).ok().flatten()?;
    serde_json::from_str(&raw).ok()
}

/// Save a JSON value under `key`.
///
/// # Errors
///
/// Returns an error if the backend write fails.
pub fn save_json<T: serde::Serialize>(storage: &dyn LocalStorage, key: &str, value: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Parse { path: PathBuf::from(key), source })?;
    storage.set(key, &raw)
}
