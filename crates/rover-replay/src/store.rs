//! Key-value persistence for recorded replays.

use std::path::{Path, PathBuf};

use hashbrown::HashMap;

/// Errors raised by a [`ReplayStore`].
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error reading or writing the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Key is empty or contains path separators.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
    /// The store refused the write (e.g. quota, read-only medium).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// String storage addressed by key.
pub trait ReplayStore {
    /// Returns the stored value, or `None` when nothing is stored under `key`.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local store. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ReplayStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created lazily on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a key is stored at.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let invalid = key.is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\'])
            || key.contains('\0');
        if invalid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl ReplayStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, value)?;
        tracing::debug!(path = %path.display(), bytes = value.len(), "Replay saved");
        Ok(())
    }
}
