//! Key-value substrates the progress store persists through.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::StoreError;

/// Minimal key-value persistence: each `set` replaces the whole value.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// In-memory store. Counts writes so callers can check how often the
/// document was persisted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, Value>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with raw values, e.g. data written by an older release.
    pub fn with_value(key: impl Into<String>, value: Value) -> Self {
        let mut values = BTreeMap::new();
        values.insert(key.into(), value);
        Self { values, writes: 0 }
    }

    /// Number of `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.writes += 1;
        Ok(())
    }
}

/// JSON file holding an object of key to value.
///
/// Writes go to a temporary file next to the target which is then renamed
/// over it, so a crash mid-write leaves the previous contents intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    operation: "read",
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            key: self.path.display().to_string(),
            source: e,
        })
    }

    fn write_all(&self, values: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(values)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let io_err = |operation: &'static str| {
            let path = temp_path.clone();
            move |source: std::io::Error| StoreError::Io {
                operation,
                path,
                source,
            }
        };

        let mut file = File::create(&temp_path).map_err(io_err("create"))?;
        file.write_all(&bytes).map_err(io_err("write"))?;
        file.sync_all().map_err(io_err("sync"))?;

        fs::rename(&temp_path, &self.path).map_err(|e| StoreError::Io {
            operation: "replace",
            path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "wrote progress file");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value);
        self.write_all(&values)
    }
}
