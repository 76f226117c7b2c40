//! Key/value store of string blobs.
//!
//! The workout collection is saved as one blob under [`WORKOUTS_KEY`]. The
//! store knows nothing about workouts; decoding lives in [`crate::record`].

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key the workout collection is stored under.
pub const WORKOUTS_KEY: &str = "workouts";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid key {0:?}")]
    InvalidKey(String),

    /// Backend refused the operation (used by test doubles and read-only setups).
    #[error("{0}")]
    Unavailable(String),
}

pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<T: BlobStore + ?Sized> BlobStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-process store; contents are lost when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    data: HashMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.data.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.data.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Creates the directory if it does not exist yet.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        tracing::debug!(dir = %dir.display(), "json blob store ready");
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        // Keys become file names; keep them to a safe alphabet.
        if key.is_empty()
            || !key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl BlobStore for JsonDirStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Io { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &mut dyn BlobStore) {
        assert_eq!(store.get(WORKOUTS_KEY).unwrap(), None);
        store.set(WORKOUTS_KEY, "[1,2]").unwrap();
        assert_eq!(store.get(WORKOUTS_KEY).unwrap().as_deref(), Some("[1,2]"));
        store.set(WORKOUTS_KEY, "[3]").unwrap();
        assert_eq!(store.get(WORKOUTS_KEY).unwrap().as_deref(), Some("[3]"));
        store.remove(WORKOUTS_KEY).unwrap();
        assert_eq!(store.get(WORKOUTS_KEY).unwrap(), None);
        store.remove(WORKOUTS_KEY).unwrap();
    }

    #[test]
    fn memory_store_basics() {
        exercise(&mut MemoryBlobStore::new());
    }

    #[test]
    fn json_dir_store_basics() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = JsonDirStore::open(&tmp.path().join("nested")).unwrap();
        exercise(&mut store);
    }

    #[test]
    fn json_dir_store_persists_across_handles() {
        let tmp = tempfile::tempdir().unwrap();
        JsonDirStore::open(tmp.path())
            .unwrap()
            .set(WORKOUTS_KEY, "hello")
            .unwrap();
        let reopened = JsonDirStore::open(tmp.path()).unwrap();
        assert_eq!(reopened.get(WORKOUTS_KEY).unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn json_dir_store_rejects_path_like_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonDirStore::open(tmp.path()).unwrap();
        assert!(matches!(
            store.get("../escape"),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn boxed_store_delegates() {
        let mut boxed: Box<dyn BlobStore> = Box::new(MemoryBlobStore::new());
        exercise(&mut boxed);
    }
}
