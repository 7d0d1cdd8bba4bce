//! Snapshot stores
//!
//! The seam between the transactional driver and wherever snapshots live.

use parking_lot::Mutex;
use stackstate_resource::Snapshot;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Loads and persists whole snapshots
///
/// Implementations own durability and cross-process locking; the driver
/// only guarantees it persists nothing when an edit fails.
pub trait SnapshotStore {
    /// Load the current snapshot
    ///
    /// # Errors
    /// Store-specific read or decode failure
    fn load(&self) -> Result<Snapshot, StoreError>;

    /// Replace the stored snapshot
    ///
    /// # Errors
    /// Store-specific write or encode failure
    fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// Snapshot stored as a JSON file
///
/// Writes go to a temporary file next to the target which is then renamed
/// over it, so readers never observe a partial snapshot.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by `path`
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        let bytes = std::fs::read(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::json(&self.path, e))
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut file =
            tempfile::NamedTempFile::new_in(self.directory()).map_err(|e| StoreError::io(&self.path, e))?;
        serde_json::to_writer_pretty(&mut file, snapshot).map_err(|e| StoreError::json(&self.path, e))?;
        file.write_all(b"\n")
            .and_then(|()| file.as_file().sync_all())
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;
        Ok(())
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    snapshot: Option<Snapshot>,
    persists: usize,
}

impl MemoryStore {
    /// Store holding `snapshot`
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                snapshot: Some(snapshot),
                persists: 0,
            }),
        }
    }

    /// Current stored snapshot
    #[must_use]
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.inner.lock().snapshot.clone()
    }

    /// Number of successful persists
    #[must_use]
    pub fn persist_count(&self) -> usize {
        self.inner.lock().persists
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        self.inner.lock().snapshot.clone().ok_or(StoreError::Empty)
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.snapshot = Some(snapshot.clone());
        inner.persists += 1;
        Ok(())
    }
}

/// Errors loading or persisting snapshots
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error on the backing file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file is not a valid snapshot
    #[error("invalid snapshot in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Nothing stored yet
    #[error("no snapshot has been stored")]
    Empty,
}

impl StoreError {
    /// Create IO error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create decode/encode error for path
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
