use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage key for the note collection.
pub const NOTES_KEY: &str = "NOTES";
/// Storage key for the tag collection.
pub const TAGS_KEY: &str = "TAGS";

/// Errors raised when writing a value to storage.
///
/// Reads never error: a missing or unparsable value falls back to the
/// caller-supplied default.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write storage key: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}

enum Backend {
    /// One `<KEY>.json` file per key under a data directory.
    Disk(PathBuf),
    /// Keyed JSON text held in memory. Used by tests and anything that
    /// wants a throwaway store.
    Memory(RefCell<HashMap<String, String>>),
}

/// Keyed JSON storage with parse-or-default reads.
///
/// Each key holds one serialized value. `read` fails soft: a missing key or
/// text that does not parse into the expected shape yields the supplied
/// default rather than an error. `write` overwrites the key synchronously so
/// a reload observes the latest state.
pub struct Storage {
    backend: Backend,
}

impl Storage {
    /// Opens in-memory storage. Nothing is persisted.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(RefCell::new(HashMap::new())),
        }
    }

    /// Opens disk-backed storage rooted at the given directory.
    ///
    /// Creates the directory if it does not exist. Each key is stored as a
    /// `<KEY>.json` file inside it.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            backend: Backend::Disk(dir),
        })
    }

    /// Reads the value stored under `key`, or `default` when the key is
    /// absent or its contents cannot be parsed.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let text = match &self.backend {
            Backend::Disk(dir) => fs::read_to_string(Self::key_path(dir, key)).ok(),
            Backend::Memory(map) => map.borrow().get(key).cloned(),
        };

        match text {
            Some(text) => serde_json::from_str(&text).unwrap_or(default),
            None => default,
        }
    }

    /// Serializes `value` and stores it under `key`, overwriting any prior
    /// value.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let text = serde_json::to_string(value)?;
        match &self.backend {
            Backend::Disk(dir) => fs::write(Self::key_path(dir, key), text)?,
            Backend::Memory(map) => {
                map.borrow_mut().insert(key.to_string(), text);
            }
        }
        Ok(())
    }

    fn key_path(dir: &Path, key: &str) -> PathBuf {
        dir.join(format!("{key}.json"))
    }
}
