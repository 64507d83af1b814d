//! Durable storage backends for the history document.
//!
//! The store talks to a [`Repository`] rather than the filesystem directly,
//! so tests run against [`MemoryRepository`] without wall-clock waits or
//! temp directories. [`FileRepository`] is the production backend: one JSON
//! document for the live history plus one write-once document per archived
//! month.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use thiserror::Error;

use super::archive::MonthKey;
use crate::data::{ArchivedMonth, StoredHistory};

/// Errors from the storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the durable document failed.
    #[error("failed to read storage: {0}")]
    Read(#[source] std::io::Error),

    /// Writing the durable document failed.
    #[error("failed to write storage: {0}")]
    Write(#[source] std::io::Error),

    /// The durable document is not valid JSON.
    #[error("failed to parse storage document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Storage backend for the live history document and monthly archives.
///
/// Writes must replace the whole document atomically; a failed write leaves
/// the previous on-disk state authoritative. Archive writes are create-only:
/// an existing archive for the same month is reported as already present,
/// never overwritten.
pub trait Repository: Send + Sync + std::fmt::Debug {
    /// Load the live document. `Ok(None)` if no document exists yet.
    fn load(&self) -> Result<Option<StoredHistory>, StoreError>;

    /// Replace the live document.
    fn store(&self, doc: &StoredHistory) -> Result<(), StoreError>;

    /// Write a monthly archive if absent. Returns `false` if an archive for
    /// this month already existed (the document is left untouched).
    fn store_archive(&self, key: MonthKey, doc: &ArchivedMonth) -> Result<bool, StoreError>;
}

/// File-backed repository: `status-history.json` plus
/// `status-archive-YYYY-MM.json` files in one directory.
#[derive(Debug)]
pub struct FileRepository {
    dir: PathBuf,
}

const LIVE_FILE: &str = "status-history.json";

impl FileRepository {
    /// Create a repository rooted at `dir`, creating the directory if
    /// needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(StoreError::Write)?;
        Ok(Self { dir })
    }

    /// Path of the live history document.
    pub fn live_path(&self) -> PathBuf {
        self.dir.join(LIVE_FILE)
    }

    /// Path of the archive document for a month.
    pub fn archive_path(&self, key: MonthKey) -> PathBuf {
        self.dir.join(format!("status-archive-{key}.json"))
    }

    /// Whole-file atomic replace: write a sibling temp file, then rename
    /// over the target.
    fn write_atomic(&self, path: &Path, json: &str) -> Result<(), StoreError> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(StoreError::Write)?;
        fs::rename(&tmp, path).map_err(StoreError::Write)
    }
}

impl Repository for FileRepository {
    fn load(&self) -> Result<Option<StoredHistory>, StoreError> {
        let path = self.live_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Read(e)),
        };
        let doc = serde_json::from_str(&content)?;
        Ok(Some(doc))
    }

    fn store(&self, doc: &StoredHistory) -> Result<(), StoreError> {
        let json = serde_json::to_string(doc)?;
        self.write_atomic(&self.live_path(), &json)
    }

    fn store_archive(&self, key: MonthKey, doc: &ArchivedMonth) -> Result<bool, StoreError> {
        let path = self.archive_path(key);
        if path.exists() {
            return Ok(false);
        }
        let json = serde_json::to_string(doc)?;
        self.write_atomic(&path, &json)?;
        Ok(true)
    }
}

/// In-memory repository for tests.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    doc: Mutex<Option<StoredHistory>>,
    archives: Mutex<HashMap<MonthKey, ArchivedMonth>>,
    fail_writes: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, to exercise the degraded path.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The archive stored for a month, if any.
    pub fn archive(&self, key: MonthKey) -> Option<ArchivedMonth> {
        self.archives.lock().unwrap().get(&key).cloned()
    }

    /// Number of archives written so far.
    pub fn archive_count(&self) -> usize {
        self.archives.lock().unwrap().len()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Write(std::io::Error::other("write disabled")))
        } else {
            Ok(())
        }
    }
}

impl Repository for MemoryRepository {
    fn load(&self) -> Result<Option<StoredHistory>, StoreError> {
        Ok(self.doc.lock().unwrap().clone())
    }

    fn store(&self, doc: &StoredHistory) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.doc.lock().unwrap() = Some(doc.clone());
        Ok(())
    }

    fn store_archive(&self, key: MonthKey, doc: &ArchivedMonth) -> Result<bool, StoreError> {
        let mut archives = self.archives.lock().unwrap();
        if archives.contains_key(&key) {
            return Ok(false);
        }
        self.check_writable()?;
        archives.insert(key, doc.clone());
        Ok(true)
    }
}
