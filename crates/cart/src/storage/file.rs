//! File-backed storage.
//!
//! All keys live in one JSON object file, mirroring a browser's local
//! storage. Writes go to a uniquely named temp file in the same directory
//! which is then renamed over the original, so a crash or failed write never
//! leaves a truncated snapshot. A file that does not decode reads as empty
//! and is replaced by the next write.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{PersistentStore, StorageError};

/// Store persisting every key to a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write of the backing file within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), error = %e, "Ignoring undecodable storage file");
                BTreeMap::new()
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PersistentStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut entries = self.read_entries()?;
        Ok(entries.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Unavailable("file store lock poisoned".to_string()))?;

        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        let encoded = serde_json::to_string_pretty(&entries)?;

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        // Dropped (and removed) unless persisted
        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(encoded.as_bytes())?;
        temp.persist(&self.path).map_err(|e| e.error)?;

        debug!(path = %self.path.display(), key, "Wrote storage file");
        Ok(())
    }
}
