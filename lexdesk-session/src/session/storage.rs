//! Session Storage - durable key/value backends for the persisted session
//!
//! Entries are opaque strings addressed by a key. The store decides what
//! goes in them; backends only keep them.

use lexdesk_core::{is_valid_storage_key, ErrorContext, LexError, LexResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

/// Durable client-side storage
pub trait SessionStorage: Send + Sync {
    /// Read an entry; `Ok(None)` when the key is absent
    fn load(&self, key: &str) -> LexResult<Option<String>>;

    /// Write an entry, replacing any previous value
    fn save(&self, key: &str, value: &str) -> LexResult<()>;

    /// Remove an entry; removing an absent key succeeds
    fn remove(&self, key: &str) -> LexResult<()>;

    /// Where the entries live, for diagnostics
    fn describe(&self) -> String;
}

fn storage_error(message: String, operation: &str) -> LexError {
    LexError::Storage {
        message,
        source: None,
        context: ErrorContext::new("session_storage").with_operation(operation),
    }
}

/// One JSON file per key inside a data directory
pub struct FileSessionStorage {
    /// Base directory for stored entries
    storage_dir: PathBuf,
}

impl FileSessionStorage {
    /// Create a file storage, creating the directory if it doesn't exist
    pub fn new<P: AsRef<Path>>(storage_dir: P) -> LexResult<Self> {
        let storage_dir = storage_dir.as_ref().to_path_buf();

        std::fs::create_dir_all(&storage_dir).map_err(|e| LexError::Storage {
            message: format!(
                "Failed to create storage directory {}: {}",
                storage_dir.display(),
                e
            ),
            source: Some(Box::new(e)),
            context: ErrorContext::new("session_storage")
                .with_operation("create_dir")
                .with_suggestion("Check storage.data_dir in your configuration"),
        })?;

        info!("Session storage initialized at: {}", storage_dir.display());

        Ok(Self { storage_dir })
    }

    fn entry_path(&self, key: &str) -> LexResult<PathBuf> {
        if !is_valid_storage_key(key) {
            return Err(storage_error(
                format!("Invalid storage key: '{}'", key),
                "entry_path",
            ));
        }

        Ok(self.storage_dir.join(format!("{}.json", key)))
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self, key: &str) -> LexResult<Option<String>> {
        let path = self.entry_path(key)?;

        if !path.exists() {
            debug!("No stored entry at {}", path.display());
            return Ok(None);
        }

        let data = std::fs::read_to_string(&path)?;
        debug!("Loaded entry '{}' from {}", key, path.display());
        Ok(Some(data))
    }

    fn save(&self, key: &str, value: &str) -> LexResult<()> {
        let path = self.entry_path(key)?;
        let tmp_path = path.with_extension("json.tmp");

        // Replaced atomically: readers see the old entry or the new one
        std::fs::write(&tmp_path, value)?;
        std::fs::rename(&tmp_path, &path)?;

        debug!("Saved entry '{}' to {}", key, path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> LexResult<()> {
        let path = self.entry_path(key)?;

        if path.exists() {
            std::fs::remove_file(&path)?;
            debug!("Deleted entry file: {}", path.display());
        }

        Ok(())
    }

    fn describe(&self) -> String {
        self.storage_dir.display().to_string()
    }
}

/// In-process storage; contents vanish with the process
#[derive(Default)]
pub struct MemorySessionStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut entries) = storage.entries.write() {
            entries.insert(key.to_string(), value.to_string());
        }
        storage
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self, key: &str) -> LexResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| storage_error(format!("Storage lock poisoned: {}", e), "load"))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> LexResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| storage_error(format!("Storage lock poisoned: {}", e), "save"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> LexResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| storage_error(format!("Storage lock poisoned: {}", e), "remove"))?;
        entries.remove(key);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
