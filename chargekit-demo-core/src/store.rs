//! Key-value persistence for client-side identity records.
//!
//! [`KeyValueStore`] is the small string-to-string contract the controller
//! persists through. Two backends are provided:
//!
//! - [`MemoryStore`] for tests and throwaway sessions
//! - [`FileStore`] keeping every key in one JSON file, used by the CLI
//!
//! # Security Warning
//!
//! [`FileStore`] is a demo store: no encryption at rest, no locking between
//! processes. It only ever holds public identifiers (wallet address,
//! subscription id), never credentials.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(String),
    #[error("Malformed record under {key}: {reason}")]
    Malformed { key: String, reason: String },
    #[error("Record under {key} has unsupported version {found}")]
    UnsupportedVersion { key: String, found: u64 },
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// String key-value storage.
///
/// Setting a key replaces its previous value. Removing a missing key is not an error.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON object mapping keys to values.
///
/// A missing file reads as an empty store. A file that is not a JSON object
/// of strings is moved to [`FileStore::corrupt_path`] and also reads as empty.
/// The directory is created on the first write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    /// File name used inside the storage directory.
    pub const FILE_NAME: &'static str = "identity.json";

    /// Create a store in `storage_dir`.
    pub fn new(storage_dir: impl AsRef<Path>) -> Self {
        Self::at_path(storage_dir.as_ref().join(Self::FILE_NAME))
    }

    /// Create a store backed by exactly `path`.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let json = std::fs::read_to_string(&self.path)?;
        if json.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_str(&json) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                self.quarantine(&e.to_string())?;
                Ok(BTreeMap::new())
            }
        }
    }

    /// Path a file that fails to parse is moved to.
    pub fn corrupt_path(&self) -> PathBuf {
        self.path.with_extension("json.corrupt")
    }

    /// Move an unreadable file aside so the next write starts from an empty map.
    fn quarantine(&self, reason: &str) -> StoreResult<()> {
        let aside = self.corrupt_path();
        tracing::warn!(
            path = %self.path.display(),
            moved_to = %aside.display(),
            reason,
            "storage file is not valid JSON; starting empty"
        );
        std::fs::rename(&self.path, &aside)?;
        Ok(())
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries).map_err(|e| StoreError::Malformed {
            key: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        // Replaced via rename; readers never see a partial file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
