#![forbid(unsafe_code)]

//! Local key-value cache, the editor's stand-in for browser local storage.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::storage::StorageError;

/// String store keyed by fixed names.
pub trait LocalCache {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Wipe every key.
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// In-memory cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryCache {
    entries: BTreeMap<String, String>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        Ok(())
    }
}

/// Directory-backed cache: one file per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Cache rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && key != "."
            && key != "..";
        if !valid {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(key))
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, value).map_err(|source| StorageError::Io { path, source })
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.dir.clone(),
                    source,
                });
            }
        };
        let mut removed = 0usize;
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() {
                fs::remove_file(&path).map_err(|source| StorageError::Io { path, source })?;
                removed += 1;
            }
        }
        debug!(dir = %self.dir.display(), removed, "local cache cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_cache_get_set_clear() {
        let mut cache = MemoryCache::new();
        assert_eq!(cache.get("characterData").unwrap(), None);
        cache.set("characterData", "{}").unwrap();
        assert_eq!(cache.get("characterData").unwrap().as_deref(), Some("{}"));
        cache.clear().unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn file_cache_persists_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::new(dir.path().join("cache"));
        assert_eq!(cache.get("characterData").unwrap(), None);

        cache.set("characterData", r#"{"a":1}"#).unwrap();
        cache.set("other", "x").unwrap();

        let reopened = FileCache::new(dir.path().join("cache"));
        assert_eq!(reopened.get("characterData").unwrap().as_deref(), Some(r#"{"a":1}"#));

        cache.clear().unwrap();
        assert_eq!(reopened.get("characterData").unwrap(), None);
        assert_eq!(reopened.get("other").unwrap(), None);
    }

    #[test]
    fn file_cache_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::new(dir.path());
        assert!(matches!(
            cache.set("../escape", "x"),
            Err(StorageError::InvalidKey { .. })
        ));
        assert!(cache.get("").is_err());
    }

    #[test]
    fn clearing_missing_dir_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::new(dir.path().join("never-created"));
        cache.clear().unwrap();
    }
}
