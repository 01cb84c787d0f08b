//! Durable key-value persistence for quota records
//!
//! A [`QuotaStorage`] is scoped to a single client and outlives the tracker
//! that reads it. Two adapters ship here: [`MemoryStorage`] for embedding
//! hosts and tests, and [`FileStorage`] which keeps one JSON file per key.

use crate::error::{QuotaError, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Whether `key` can double as a file name inside the data directory
pub(crate) fn is_file_safe_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Key-value store with process-external lifetime
#[cfg_attr(test, mockall::automock)]
pub trait QuotaStorage: Send + Sync {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process store; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QuotaStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| QuotaError::unavailable(key, format!("lock error: {e}")))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .map_err(|e| QuotaError::unavailable(key, format!("lock error: {e}")))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// The directory is created lazily on the first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn check_key(key: &str) -> Result<()> {
        if is_file_safe_key(key) {
            Ok(())
        } else {
            Err(QuotaError::unavailable(key, "key is not a file name"))
        }
    }
}

impl QuotaStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Self::check_key(key)?;
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::check_key(key)?;
        fs::create_dir_all(&self.dir)?;

        // Write-then-rename keeps the previous record intact if we die mid-write.
        let path = self.path_for(key);
        let mut tmp = path.clone();
        tmp.set_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_safe_key_rule() {
        for key in ["azak_view_limit", "visitor-42", "a.b"] {
            assert!(is_file_safe_key(key), "{key:?} should be accepted");
        }
        for key in ["", ".hidden", "../escape", "a/b", "a b", "키"] {
            assert!(!is_file_safe_key(key), "{key:?} should be rejected");
        }
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v1").unwrap();
        storage.set("k", "v2").unwrap();

        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_memory_storage_clones_share_state() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_file_storage_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("not-yet-created"));

        assert_eq!(storage.get("azak_view_limit").unwrap(), None);
        assert!(!storage.dir().exists());
    }

    #[test]
    fn test_file_storage_write_creates_dir_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("data"));

        storage.set("azak_view_limit", "first").unwrap();
        storage.set("azak_view_limit", "second").unwrap();

        assert_eq!(
            storage.get("azak_view_limit").unwrap().as_deref(),
            Some("second")
        );
        assert!(storage.path_for("azak_view_limit").exists());

        let leftovers: Vec<_> = fs::read_dir(storage.dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        assert!(storage.set("../outside", "x").is_err());
        assert!(storage.get("a/b").is_err());
        assert!(storage.get("").is_err());
    }

    #[test]
    fn test_file_storage_unreadable_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        // A directory where the record file should be cannot be read as text.
        fs::create_dir_all(storage.path_for("azak_view_limit")).unwrap();
        assert!(storage.get("azak_view_limit").is_err());
    }
}
