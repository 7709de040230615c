// src/storage.rs
//! Persistence seam for the order ledger: a small store trait, a JSON file
//! implementation, and an in-memory double for tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};

use crate::ledger::LedgerData;

pub trait LedgerStore: Send + Sync {
    /// Load the full ledger document. Absence of prior data is an empty
    /// ledger, not an error.
    fn load(&self) -> Result<LedgerData>;
    /// Persist the full ledger document; must flush before returning.
    fn save(&self, data: &LedgerData) -> Result<()>;
}

/// Stores the ledger as one pretty-printed JSON document.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<LedgerData> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LedgerData::default())
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading ledger {}", self.path.display()))
            }
        };
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing ledger {}", self.path.display()))
    }

    fn save(&self, data: &LedgerData) -> Result<()> {
        let json = serde_json::to_string_pretty(data).context("serializing ledger")?;
        fs::write(&self.path, json)
            .with_context(|| format!("writing ledger {}", self.path.display()))
    }
}

// --- Test helper ---
pub struct MemoryStore {
    inner: Mutex<LedgerData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LedgerData::default()),
        }
    }

    /// Current persisted state, as a later `load()` would see it.
    pub fn persisted(&self) -> LedgerData {
        self.inner.lock().unwrap().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<LedgerData> {
        Ok(self.inner.lock().unwrap().clone())
    }

    fn save(&self, data: &LedgerData) -> Result<()> {
        *self.inner.lock().unwrap() = data.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("orders.json"));
        let data = store.load().unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error_not_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(JsonFileStore::new(&path).load().is_err());
    }
}
