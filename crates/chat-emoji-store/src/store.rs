//! File-based record storage

use crate::error::{Result, StoreError};
use crate::key::{CacheKey, RECORD_EXTENSION};
use crate::types::{CacheRecord, CachedEmoji};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::{debug, info, warn};

/// A directory of cache records, one JSON file per key
pub struct CacheStore {
    /// Directory where records are stored
    dir: PathBuf,
    /// Sequence for temporary file names
    tmp_seq: AtomicU64,
}

impl CacheStore {
    /// Create a store rooted at `dir`. Nothing is touched on disk yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tmp_seq: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ensure the cache directory exists
    pub async fn init(&self) -> Result<()> {
        self.ensure_dir().await?;
        info!(cache_dir = ?self.dir, "Cache initialized");
        Ok(())
    }

    async fn ensure_dir(&self) -> Result<()> {
        if !fs::try_exists(&self.dir).await? {
            info!(cache_dir = ?self.dir, "Creating cache directory");
            fs::create_dir_all(&self.dir).await?;
        }
        Ok(())
    }

    /// Path of the record file for `key`
    pub fn record_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Paths a record for `key` may live at: the current name first, then
    /// the standard-alphabet name older deployments wrote
    fn candidate_paths(&self, key: &CacheKey) -> Vec<PathBuf> {
        let mut paths = vec![self.record_path(key)];
        if let Some(legacy) = key.legacy_file_name() {
            paths.push(self.dir.join(legacy));
        }
        paths
    }

    /// Whether a record exists for `key`
    pub async fn has(&self, key: &CacheKey) -> Result<bool> {
        for path in self.candidate_paths(key) {
            if fs::try_exists(&path).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Read and decode the record for `key`
    ///
    /// Returns `Ok(None)` when there is no record and [`StoreError::Corrupt`]
    /// when one exists but cannot be parsed. A record under the current name
    /// shadows one under the standard-alphabet name.
    pub async fn get(&self, key: &CacheKey) -> Result<Option<CachedEmoji>> {
        let mut raw = None;
        for path in self.candidate_paths(key) {
            match fs::read(&path).await {
                Ok(bytes) => {
                    raw = Some(bytes);
                    break;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        let Some(raw) = raw else {
            return Ok(None);
        };

        let record: CacheRecord =
            serde_json::from_slice(&raw).map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        let emoji = record.into_emoji().map_err(|reason| StoreError::Corrupt {
            key: key.to_string(),
            reason,
        })?;

        Ok(Some(emoji))
    }

    /// Write a new record for `key`, replacing any existing one
    ///
    /// The record is written to a temporary file and renamed into place, so a
    /// reader sees either the old record or the new one, never a partial one.
    pub async fn put(&self, key: &CacheKey, content_type: &str, body: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let record = CacheRecord::new(content_type, body);
        let json = serde_json::to_vec(&record)?;

        let final_path = self.record_path(key);
        let tmp_path = self.tmp_path();

        if let Err(e) = fs::write(&tmp_path, &json).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp_path, &final_path).await {
            warn!(key = %key, error = %e, "Failed to move cache record into place");
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        debug!(key = %key, size = body.len(), "Cached emoji");
        Ok(())
    }

    /// Temporary file name independent of the key, so any key whose record
    /// name fits the filesystem also has a writable temp file
    fn tmp_path(&self) -> PathBuf {
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{}-{}.tmp", std::process::id(), seq))
    }

    /// Keys of every record currently on disk, in directory order
    ///
    /// Stems are not validated; callers decode them and decide what to do
    /// with the ones that do not name a path.
    pub async fn list_keys(&self) -> Result<Vec<CacheKey>> {
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if !stem.is_empty() && !stem.starts_with('.') => {
                    keys.push(CacheKey::from_file_stem(stem));
                }
                _ => debug!(path = ?path, "Skipping unrecognized file in cache directory"),
            }
        }

        Ok(keys)
    }
}
