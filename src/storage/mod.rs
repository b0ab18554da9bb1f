use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{app_config_path, config_env_dirs, ConfigPathError, APP_DIR};

const STORE_FILE: &str = "themes.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable { message: String },
    #[error("storage quota of {limit} bytes exceeded while writing {key}")]
    QuotaExceeded { key: String, limit: usize },
    #[error("failed to read store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store {path} is not a valid key/value document: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// String key/value persistence. Callers treat every failure as recoverable.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

/// In-process store, optionally simulating an unavailable or size-capped backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    unavailable: bool,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation fails, like disabled browser storage.
    pub fn failing() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_available(&self) -> StorageResult<()> {
        if self.unavailable {
            return Err(StorageError::Unavailable {
                message: "memory store disabled".to_string(),
            });
        }
        Ok(())
    }

    fn used_bytes_with(&self, key: &str, value: &str) -> usize {
        self.entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + value.len()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.ensure_available()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.ensure_available()?;
        if let Some(limit) = self.quota_bytes {
            if self.used_bytes_with(key, value) > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    limit,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.ensure_available()?;
        self.entries.remove(key);
        Ok(())
    }
}

/// All keys kept in one pretty-printed JSON object on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: PathBuf) -> StorageResult<Self> {
        let entries = if path.exists() {
            let serialized = fs::read_to_string(&path).map_err(|source| StorageError::Read {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&serialized).map_err(|source| StorageError::Corrupt {
                path: path.clone(),
                source,
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn with_default_path() -> StorageResult<Self> {
        let (xdg_config_home, home) = config_env_dirs();
        Self::open(default_store_path(
            xdg_config_home.as_deref(),
            home.as_deref(),
        )?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> StorageResult<()> {
        let write_error = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let serialized =
            serde_json::to_string_pretty(&self.entries).map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, serialized).map_err(write_error)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Store selected at startup: the JSON file when persistence is on and reachable, memory
/// otherwise.
#[derive(Debug, Clone)]
pub enum ThemeStore {
    File(JsonFileStore),
    Memory(MemoryStore),
}

impl ThemeStore {
    pub fn open(persist: bool) -> Self {
        if !persist {
            return Self::Memory(MemoryStore::new());
        }
        match JsonFileStore::with_default_path() {
            Ok(store) => Self::File(store),
            Err(err) => {
                tracing::warn!(%err, "theme store unavailable; themes will not persist");
                Self::Memory(MemoryStore::new())
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

impl KeyValueStore for ThemeStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match self {
            Self::File(store) => store.get(key),
            Self::Memory(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        match self {
            Self::File(store) => store.set(key, value),
            Self::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        match self {
            Self::File(store) => store.remove(key),
            Self::Memory(store) => store.remove(key),
        }
    }
}

fn default_store_path(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> StorageResult<PathBuf> {
    app_config_path(APP_DIR, STORE_FILE, xdg_config_home, home).map_err(|error| match error {
        ConfigPathError::MissingHomeDirectory => StorageError::Unavailable {
            message: "neither XDG_CONFIG_HOME nor HOME is set".to_string(),
        },
    })
}
