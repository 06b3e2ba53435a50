//! # Local Filesystem Tier
//!
//! One pretty-printed JSON file per record: `<root>/<id>.json`.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;

use super::errors::{StoreError, StoreResult};
use super::record::Record;

const EXTENSION: &str = "json";

/// Local record directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `root`; the directory is created on first write
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create a store and make sure its directory exists
    pub fn open(root: PathBuf) -> StoreResult<Self> {
        fs::create_dir_all(&root).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(Self { root })
    }

    fn full_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.{}", id, EXTENSION))
    }

    /// Reads a record. `Ok(None)` means the file does not exist.
    pub fn read(&self, id: &str) -> StoreResult<Option<Record>> {
        let data = match fs::read(self.full_path(id)) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                id: id.to_string(),
                reason: e.to_string(),
            })
    }

    /// Serializes and writes a record, returning the bytes written
    pub fn write(&self, id: &str, record: &Record) -> StoreResult<Vec<u8>> {
        let data = serde_json::to_vec_pretty(record).map_err(|e| StoreError::Corrupt {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
        self.write_bytes(id, &data)?;
        Ok(data)
    }

    /// Writes raw bytes through a temp file so readers never see a partial record.
    /// Every call gets its own temp file; concurrent writers of one id race
    /// only on the final rename.
    pub fn write_bytes(&self, id: &str, data: &[u8]) -> StoreResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| StoreError::Io(e.to_string()))?;

        let mut tmp =
            NamedTempFile::new_in(&self.root).map_err(|e| StoreError::Io(e.to_string()))?;
        tmp.write_all(data).map_err(|e| StoreError::Io(e.to_string()))?;
        tmp.persist(self.full_path(id))
            .map_err(|e| StoreError::Io(e.error.to_string()))?;
        Ok(())
    }

    /// Checks if a record file exists
    pub fn exists(&self, id: &str) -> bool {
        self.full_path(id).is_file()
    }

    /// Lists the ids of all record files, sorted
    pub fn ids(&self) -> StoreResult<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        let mut ids = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}
