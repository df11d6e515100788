//! Maintenance file cache with modification-time invalidation.

use axum::body::Bytes;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;
use thiserror::Error;

/// Errors raised while (re)loading the maintenance file.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("error accessing maintenance file {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading maintenance file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("maintenance file is empty: {0}")]
    EmptyFile(PathBuf),
}

#[derive(Debug, Clone)]
struct CachedFile {
    bytes: Bytes,
    modified: SystemTime,
}

/// Holds the last loaded maintenance file.
///
/// Reloads take the write lock for the whole stat+read+swap sequence, so
/// readers see either the old or the new content in full.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    state: RwLock<Option<CachedFile>>,
}

impl FileCache {
    /// Create a cache and load the file immediately.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let cache = Self {
            path: path.into(),
            state: RwLock::new(None),
        };
        cache.ensure_loaded()?;
        Ok(cache)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload the file if its modification time moved past the cached one.
    /// Returns whether new content was loaded.
    pub fn ensure_loaded(&self) -> Result<bool, CacheError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        let modified = fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .map_err(|source| CacheError::FileAccess {
                path: self.path.clone(),
                source,
            })?;

        if let Some(cached) = state.as_ref() {
            if modified <= cached.modified {
                return Ok(false);
            }
        }

        let bytes = fs::read(&self.path).map_err(|source| CacheError::FileRead {
            path: self.path.clone(),
            source,
        })?;

        if bytes.is_empty() {
            return Err(CacheError::EmptyFile(self.path.clone()));
        }

        *state = Some(CachedFile {
            bytes: Bytes::from(bytes),
            modified,
        });
        Ok(true)
    }

    /// Current cached content (shared read).
    pub fn content(&self) -> Option<Bytes> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.as_ref().map(|c| c.bytes.clone())
    }

    /// Modification time of the cached content.
    pub fn last_modified(&self) -> Option<SystemTime> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.as_ref().map(|c| c.modified)
    }
}
