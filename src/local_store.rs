//! Flat key-value persistence for settings, the bin id, and the offline quote cache.
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use log::{debug, error, trace, warn};
use tempfile::NamedTempFile;

use crate::{QuoteError, Result};

/// Key under which the offline copy of the collection is stored.
pub const QUOTES_KEY: &str = "quotes";
/// Key under which a bin id issued by the remote store is stored.
pub const BIN_ID_KEY: &str = "binId";

/// String-to-string storage shared by the settings and quotes state.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`. Failures are reported, never swallowed.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// A store backed by a single JSON object on disk.
///
/// The whole map is cached in memory and rewritten atomically on every change.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`, loading existing entries if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = if path.exists() {
            debug!("Loading local store from {}", path.display());
            let content = fs::read_to_string(&path).map_err(|e| {
                error!("Failed to read local store {}: {}", path.display(), e);
                QuoteError::Io(e)
            })?;
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&content).unwrap_or_else(|e| {
                    warn!(
                        "Local store {} is unreadable, starting empty: {}",
                        path.display(),
                        e
                    );
                    HashMap::new()
                })
            }
        } else {
            trace!("No local store at {}, starting empty", path.display());
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_failed() -> QuoteError {
        QuoteError::LockAcquisitionFailed {
            message: "Failed to acquire lock on local store".to_string(),
        }
    }

    /// Writes the full map using a temporary file and rename.
    fn flush(&self, entries: &HashMap<String, String>) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        if !dir.exists() {
            debug!("Creating local store directory: {}", dir.display());
            fs::create_dir_all(dir)?;
        }

        // Sorted keys keep the file diff-friendly.
        let sorted: BTreeMap<&String, &String> = entries.iter().collect();
        let json = serde_json::to_string_pretty(&sorted)?;

        let mut temp_file = NamedTempFile::new_in(dir)?;
        temp_file.write_all(json.as_bytes())?;
        temp_file.flush()?;
        temp_file.persist(&self.path).map_err(|e| {
            error!(
                "Failed to persist local store {}: {}",
                self.path.display(),
                e.error
            );
            QuoteError::Io(e.error)
        })?;

        trace!("Local store written to {}", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(e) => {
                warn!("Failed to acquire lock on local store: {}", e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| Self::lock_failed())?;
        let previous = entries.insert(key.to_string(), value.to_string());

        if let Err(e) = self.flush(&entries) {
            // Keep memory and disk in agreement.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| Self::lock_failed())?;
        if let Some(old) = entries.remove(key) {
            if let Err(e) = self.flush(&entries) {
                entries.insert(key.to_string(), old);
                return Err(e);
            }
        }
        Ok(())
    }
}

/// A non-persistent store.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| QuoteError::LockAcquisitionFailed {
                message: "Failed to acquire lock on memory store".to_string(),
            })?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| QuoteError::LockAcquisitionFailed {
                message: "Failed to acquire lock on memory store".to_string(),
            })?
            .remove(key);
        Ok(())
    }
}
