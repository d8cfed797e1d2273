//! Prefixed key-value storage with optional per-key expiry
//!
//! Backs the persisted client state (session tokens, anonymous
//! identity). Two backends are supported: `Session` keeps values in
//! memory for the lifetime of the process, `Local` writes one JSON
//! file per key so values survive restarts. Expired entries are
//! deleted lazily on the next read.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::error::Result;

/// Storage backend selection
#[derive(Clone, Debug)]
pub enum StorageBackend {
    /// In-memory, process lifetime
    Session,
    /// File-backed, one JSON file per key under the given directory
    Local(PathBuf),
}

impl StorageBackend {
    /// Default local directory, honoring `STARLIGHT_STORAGE_PATH`
    pub fn local_default() -> Self {
        if let Ok(path) = std::env::var("STARLIGHT_STORAGE_PATH") {
            return Self::Local(PathBuf::from(path));
        }
        if let Ok(home) = std::env::var("HOME") {
            return Self::Local(PathBuf::from(home).join(".starlight").join("storage"));
        }
        Self::Local(PathBuf::from(".starlight").join("storage"))
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct Entry {
    value: serde_json::Value,
    expires_at_ms: Option<u64>,
}

impl Entry {
    fn is_expired(&self, now_ms: u64) -> bool {
        matches!(self.expires_at_ms, Some(at) if at < now_ms)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Key-value store scoped under a prefix
pub struct ScopedStorage {
    prefix: String,
    backend: StorageBackend,
    session: Mutex<HashMap<String, Entry>>,
}

impl ScopedStorage {
    /// Create a storage scoped under `prefix`
    pub fn new(prefix: &str, backend: StorageBackend) -> Self {
        Self {
            prefix: prefix.to_string(),
            backend,
            session: Mutex::new(HashMap::new()),
        }
    }

    fn compute_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn entry_file(&self, dir: &PathBuf, key: &str) -> PathBuf {
        dir.join(format!("{}.json", self.compute_key(key)))
    }

    /// Store a value, optionally expiring after `expires_seconds`
    pub fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expires_seconds: Option<u64>,
    ) -> Result<()> {
        let entry = Entry {
            value: serde_json::to_value(value)?,
            expires_at_ms: expires_seconds.map(|s| now_ms() + s * 1000),
        };

        match &self.backend {
            StorageBackend::Session => {
                self.session.lock().insert(self.compute_key(key), entry);
            }
            StorageBackend::Local(dir) => {
                fs::create_dir_all(dir)?;
                let file = self.entry_file(dir, key);
                fs::write(&file, serde_json::to_vec(&entry)?)?;
            }
        }
        Ok(())
    }

    /// Read a value; an expired entry is removed and reads as `None`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = match &self.backend {
            StorageBackend::Session => {
                let mut guard = self.session.lock();
                let full_key = self.compute_key(key);
                let expired = guard
                    .get(&full_key)
                    .map(|e| e.is_expired(now_ms()))
                    .unwrap_or(false);
                if expired {
                    guard.remove(&full_key);
                    return None;
                }
                guard.get(&full_key).map(|e| e.value.clone())
            }
            StorageBackend::Local(dir) => {
                let file = self.entry_file(dir, key);
                let bytes = fs::read(&file).ok()?;
                match serde_json::from_slice::<Entry>(&bytes) {
                    Ok(entry) if entry.is_expired(now_ms()) => {
                        let _ = fs::remove_file(&file);
                        return None;
                    }
                    Ok(entry) => Some(entry.value),
                    Err(e) => {
                        warn!("Discarding unreadable storage entry {}: {}", key, e);
                        let _ = fs::remove_file(&file);
                        return None;
                    }
                }
            }
        }?;

        serde_json::from_value(entry).ok()
    }

    /// Remove a single key
    pub fn remove(&self, key: &str) {
        match &self.backend {
            StorageBackend::Session => {
                self.session.lock().remove(&self.compute_key(key));
            }
            StorageBackend::Local(dir) => {
                let _ = fs::remove_file(self.entry_file(dir, key));
            }
        }
    }

    /// Remove every key under this storage's prefix
    pub fn clear(&self) {
        match &self.backend {
            StorageBackend::Session => {
                self.session
                    .lock()
                    .retain(|key, _| !key.starts_with(&self.prefix));
            }
            StorageBackend::Local(dir) => {
                let Ok(entries) = fs::read_dir(dir) else {
                    return;
                };
                for entry in entries.flatten() {
                    let name = entry.file_name();
                    if name.to_string_lossy().starts_with(&self.prefix) {
                        let _ = fs::remove_file(entry.path());
                    }
                }
            }
        }
    }
}
