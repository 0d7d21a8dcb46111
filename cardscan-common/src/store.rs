//! Atomic JSON persistence and file-backed snapshot stores
//!
//! Every persisted file is written with the temp + rename pattern:
//! 1. Serialize to pretty JSON
//! 2. Write `<file>.tmp` and fsync it
//! 3. Rename over the destination
//!
//! A reader never observes a partially written file. When any step fails
//! the temp file is removed and the previously committed file is left as it
//! was.

use crate::records::SnapshotRecord;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const CATALOG_FILE: &str = "catalog.json";
pub const CURRENT_FILE: &str = "current.json";
pub const BASELINE_FILE: &str = "baseline.json";
pub const CONFIG_FILE: &str = "config.json";
pub const SCAN_LOG_FILE: &str = "scan.log";

/// Temp path used while writing `path`
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `value` as pretty JSON to `path` atomically
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let temp_path = temp_path_for(path);

    let result = write_and_sync(&temp_path, json.as_bytes())
        .and_then(|_| fs::rename(&temp_path, path));

    if let Err(source) = result {
        if temp_path.exists() {
            if let Err(e) = fs::remove_file(&temp_path) {
                tracing::warn!(path = %temp_path.display(), error = %e, "Failed to remove temp file");
            }
        }
        return Err(Error::Persistence {
            path: path.to_path_buf(),
            source,
        });
    }

    tracing::debug!(path = %path.display(), bytes = json.len(), "Wrote JSON file");
    Ok(())
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Read and parse a JSON file; `None` when it does not exist
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Io(e)),
    }
}

/// Which snapshot generation a store holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Current,
    Baseline,
}

impl SnapshotKind {
    fn missing_error(self) -> Error {
        match self {
            SnapshotKind::Current => Error::MissingCurrent,
            SnapshotKind::Baseline => Error::MissingBaseline,
        }
    }
}

/// Single-version snapshot repository backed by one JSON file
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    kind: SnapshotKind,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>, kind: SnapshotKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> SnapshotKind {
        self.kind
    }

    pub fn load(&self) -> Result<Option<Vec<SnapshotRecord>>> {
        read_json(&self.path)
    }

    /// Load, mapping absence to `MissingCurrent` / `MissingBaseline`
    pub fn load_required(&self) -> Result<Vec<SnapshotRecord>> {
        self.load()?.ok_or_else(|| self.kind.missing_error())
    }

    /// Replace the stored snapshot in full
    pub fn save(&self, records: &[SnapshotRecord]) -> Result<()> {
        write_json_atomic(&self.path, records)
    }
}

/// Locations of every persisted file under one data directory
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the data directory if missing
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
            tracing::info!(path = %self.root.display(), "Created data directory");
        }
        Ok(())
    }

    pub fn catalog(&self) -> PathBuf {
        self.root.join(CATALOG_FILE)
    }

    pub fn config(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn scan_log(&self) -> PathBuf {
        self.root.join(SCAN_LOG_FILE)
    }

    pub fn current_store(&self) -> SnapshotStore {
        SnapshotStore::new(self.root.join(CURRENT_FILE), SnapshotKind::Current)
    }

    pub fn baseline_store(&self) -> SnapshotStore {
        SnapshotStore::new(self.root.join(BASELINE_FILE), SnapshotKind::Baseline)
    }
}
