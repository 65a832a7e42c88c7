//! Storage layer for rota
//!
//! All persistent state lives under a `.rota/` directory next to the
//! `.rota.toml` config file:
//!
//! ```text
//! .rota.toml                    # Configuration
//! .rota/
//!   templates.json              # Recurring task templates (the source)
//!   occurrences.json            # Canonical occurrence store
//!   persons.json                # Assignee registry (display colors)
//!   calendar.json               # Persisted calendar year/month selector
//!   store.lock                  # Pipeline write-back lock
//! ```
//!
//! Writes go through `write_atomic` (temp file + rename) so readers never
//! see a partially written file and a failed pipeline run leaves the prior
//! contents in place.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};
use crate::lock::{FileLock, DEFAULT_LOCK_TIMEOUT_MS};

/// Name of the data directory
pub const DATA_DIR: &str = ".rota";

/// Name of the config file, next to the data directory
pub const CONFIG_FILE: &str = ".rota.toml";

/// Storage manager for rota state
#[derive(Debug, Clone)]
pub struct Storage {
    /// Directory that holds `.rota.toml` and `.rota/`
    root: PathBuf,
}

impl Storage {
    /// Create a storage manager rooted at the given directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    /// Root directory (where `.rota.toml` lives)
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the `.rota/` data directory
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    /// Path to the config file
    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Path to the template registry
    pub fn templates_file(&self) -> PathBuf {
        self.data_dir().join("templates.json")
    }

    /// Path to the canonical occurrence store
    pub fn occurrences_file(&self) -> PathBuf {
        self.data_dir().join("occurrences.json")
    }

    /// Path to the persons registry
    pub fn persons_file(&self) -> PathBuf {
        self.data_dir().join("persons.json")
    }

    /// Path to the persisted calendar selector
    pub fn calendar_file(&self) -> PathBuf {
        self.data_dir().join("calendar.json")
    }

    /// Path to the pipeline lock file
    pub fn lock_file(&self) -> PathBuf {
        self.data_dir().join("store.lock")
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Create the data directory
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.data_dir())?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.data_dir().exists()
    }

    /// Error unless `rota init` has been run here
    pub fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized(self.root.clone()))
        }
    }

    /// Acquire the pipeline lock; held for the duration of a write-back
    pub fn lock(&self) -> Result<FileLock> {
        FileLock::acquire(self.lock_file(), DEFAULT_LOCK_TIMEOUT_MS)
    }

    // =========================================================================
    // File I/O helpers (atomic writes for safety)
    // =========================================================================

    /// Write JSON data atomically (write to temp, then rename)
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        self.write_atomic(path, json.as_bytes())
    }

    /// Read JSON data from a file
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let data: T = serde_json::from_str(&content)?;
        Ok(data)
    }

    /// Read JSON data, or return a default if the file does not exist yet
    pub fn read_json_or<T: DeserializeOwned>(&self, path: &Path, default: impl FnOnce() -> T) -> Result<T> {
        if !path.exists() {
            return Ok(default());
        }
        self.read_json(path)
    }

    /// Write data atomically using temp file + rename
    ///
    /// Either the file is fully written or the prior contents remain.
    pub fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");

        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;

        fs::rename(&temp_path, path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        value: u32,
    }

    fn storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::new(dir.path().to_path_buf());
        (dir, storage)
    }

    #[test]
    fn init_creates_data_dir() {
        let (_dir, storage) = storage();
        assert!(!storage.is_initialized());
        storage.init().expect("init");
        assert!(storage.is_initialized());
        assert!(storage.data_dir().is_dir());
    }

    #[test]
    fn ensure_initialized_errors_before_init() {
        let (_dir, storage) = storage();
        let err = storage.ensure_initialized().unwrap_err();
        assert!(matches!(err, Error::NotInitialized(_)));
    }

    #[test]
    fn json_round_trip_is_atomic_path() {
        let (_dir, storage) = storage();
        storage.init().expect("init");

        let path = storage.data_dir().join("sample.json");
        storage.write_json(&path, &Sample { value: 7 }).expect("write");

        let read: Sample = storage.read_json(&path).expect("read");
        assert_eq!(read, Sample { value: 7 });
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn read_json_or_returns_default_for_missing_file() {
        let (_dir, storage) = storage();
        storage.init().expect("init");

        let path = storage.data_dir().join("missing.json");
        let read: Sample = storage
            .read_json_or(&path, || Sample { value: 0 })
            .expect("read");
        assert_eq!(read.value, 0);
    }
}
