//! # Ledger File Store
//!
//! Loads and saves the registry ledger as pretty-printed JSON. Saves go
//! through a temporary file in the same directory followed by a rename, so
//! a crash mid-write leaves the previous ledger intact.
//!
//! Separate processes coordinate through an advisory lock on a sidecar
//! `<ledger>.lock` file. The ledger itself is never locked because the
//! rename replaces it. Writers hold [`LedgerStore::lock_exclusive`] across
//! load, apply, and save; readers hold [`LedgerStore::lock_shared`].

use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use credreg_core::Clock;
use credreg_state::{CredentialRegistry, Ledger, RegistryError};

/// Errors reading or writing the ledger file.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("ledger file {path}: {source}")]
    Io {
        /// The ledger path.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The file is not a ledger document.
    #[error("ledger file {path} is not valid JSON: {source}")]
    Json {
        /// The ledger path.
        path: String,
        /// The JSON error.
        source: serde_json::Error,
    },

    /// The lock file could not be opened or locked.
    #[error("cannot lock {path}: {source}")]
    Lock {
        /// The lock file path.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The ledger failed verification or replay.
    #[error("ledger file {path} rejected: {source}")]
    Registry {
        /// The ledger path.
        path: String,
        /// The registry error.
        source: RegistryError,
    },
}

/// Advisory lock on a ledger's sidecar lock file. Released on drop.
#[derive(Debug)]
pub struct LedgerLock {
    file: File,
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        // Closing the descriptor releases the lock even if this fails.
        let _ = FileExt::unlock(&self.file);
    }
}

/// A ledger persisted at one path.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    /// A store at `path`. Nothing is read until [`LedgerStore::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The ledger path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The sidecar lock file: the ledger path with `.lock` appended.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("ledger"));
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Block until no other process holds any lock on this ledger.
    pub fn lock_exclusive(&self) -> Result<LedgerLock, StoreError> {
        let file = self.open_lock_file()?;
        FileExt::lock_exclusive(&file).map_err(|e| self.lock_error(e))?;
        tracing::debug!(path = %self.path.display(), "exclusive ledger lock acquired");
        Ok(LedgerLock { file })
    }

    /// Block until no other process holds the exclusive lock.
    pub fn lock_shared(&self) -> Result<LedgerLock, StoreError> {
        let file = self.open_lock_file()?;
        FileExt::lock_shared(&file).map_err(|e| self.lock_error(e))?;
        tracing::debug!(path = %self.path.display(), "shared ledger lock acquired");
        Ok(LedgerLock { file })
    }

    /// Read the ledger. A missing file is an empty ledger.
    pub fn load(&self) -> Result<Ledger, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no ledger file, starting empty");
                return Ok(Ledger::new());
            }
            Err(source) => return Err(self.io_error(source)),
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
            path: self.display(),
            source,
        })
    }

    /// Load, verify, and replay the ledger into a registry.
    pub fn open_registry<C: Clock>(&self, clock: C) -> Result<CredentialRegistry<C>, StoreError> {
        let ledger = self.load()?;
        let entries = ledger.len();
        let registry =
            CredentialRegistry::from_ledger(ledger, clock).map_err(|source| StoreError::Registry {
                path: self.display(),
                source,
            })?;
        tracing::debug!(
            path = %self.path.display(),
            entries,
            credentials = registry.len(),
            "registry opened"
        );
        Ok(registry)
    }

    /// Atomically replace the ledger file with `ledger`.
    pub fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let json = serde_json::to_vec_pretty(ledger).map_err(|source| StoreError::Json {
            path: self.display(),
            source,
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(&json).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        tracing::debug!(path = %self.path.display(), entries = ledger.len(), "ledger saved");
        Ok(())
    }

    fn open_lock_file(&self) -> Result<File, StoreError> {
        std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(|e| self.lock_error(e))
    }

    fn lock_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Lock {
            path: self.lock_path().display().to_string(),
            source,
        }
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.display(),
            source,
        }
    }
}
