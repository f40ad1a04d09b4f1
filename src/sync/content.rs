//! Hash-gated upload of local files
//!
//! For every file the stored hash marker is read first; only a missing or
//! different digest triggers an upload. The content object is written before
//! the marker, so a failure between the two leaves a stale marker and the
//! next run uploads the file again.

use crate::crawler::WorkerPool;
use crate::state::SyncOutcome;
use crate::sync::digest::FileRecord;
use crate::sync::keys::RemoteKeys;
use crate::sync::store::{ObjectStore, StoreError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A downloaded file waiting to be mirrored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Where the file lives on disk
    pub path: PathBuf,

    /// Logical grouping, the dataset title
    pub dataset: String,

    /// Name used in remote keys
    pub file_name: String,
}

impl LocalFile {
    pub fn new(
        path: impl Into<PathBuf>,
        dataset: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            dataset: dataset.into(),
            file_name: file_name.into(),
        }
    }
}

/// Why a single file could not be synchronized
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of syncing one file, failures included
#[derive(Debug)]
pub struct FileSyncResult {
    pub file: LocalFile,
    pub outcome: Result<SyncOutcome, SyncError>,
}

/// Mirrors local files into an object store, skipping unchanged content
pub struct ContentSync<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    prefix: String,
    capture_date: String,
}

impl<'a, S: ObjectStore + ?Sized> ContentSync<'a, S> {
    /// Creates a sync step writing under `prefix`, stamping content keys
    /// with `capture_date` (`YYYY-MM-DD`)
    pub fn new(store: &'a S, prefix: impl Into<String>, capture_date: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            capture_date: capture_date.into(),
        }
    }

    pub fn capture_date(&self) -> &str {
        &self.capture_date
    }

    /// Keys used for `file` in this run
    pub fn keys_for(&self, file: &LocalFile) -> RemoteKeys {
        RemoteKeys::new(&self.prefix, &file.dataset, &file.file_name, &self.capture_date)
    }

    /// Synchronizes one file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, the marker read fails for a reason
    /// other than absence, or either upload fails.
    pub async fn sync_file(&self, file: &LocalFile) -> Result<SyncOutcome, SyncError> {
        let (record, bytes) = FileRecord::load(&file.path)
            .await
            .map_err(|source| SyncError::Read {
                path: file.path.clone(),
                source,
            })?;
        let keys = self.keys_for(file);

        let stored = self.store.get(&keys.hash_key).await?;
        let stored_digest = stored.as_deref().map(String::from_utf8_lossy);

        if stored_digest.as_deref().map(str::trim) == Some(record.digest.as_str()) {
            tracing::debug!("{} unchanged, no updates", keys.hash_key);
            return Ok(SyncOutcome::Unchanged);
        }

        if stored_digest.is_none() {
            tracing::debug!("No recorded digest at {}", keys.hash_key);
        }

        self.store
            .put(&keys.content_key, bytes, content_type_for(&file.file_name))
            .await?;
        self.store
            .put(&keys.hash_key, record.digest.into_bytes(), "text/plain")
            .await?;

        tracing::info!("Uploaded {}", keys.content_key);
        Ok(SyncOutcome::Uploaded {
            content_key: keys.content_key,
        })
    }

    /// Synchronizes every file through `pool`
    ///
    /// Each file is handled on its own: one failure never stops the others.
    pub async fn sync_all(
        &self,
        pool: &WorkerPool,
        files: Vec<LocalFile>,
    ) -> Vec<FileSyncResult> {
        pool.run(files, |file| async move {
            let outcome = self.sync_file(&file).await;
            if let Err(e) = &outcome {
                tracing::error!("Sync failed for {}: {}", file.path.display(), e);
            }
            FileSyncResult { file, outcome }
        })
        .await
    }
}

/// Capture date for today in UTC, formatted `YYYY-MM-DD`
pub fn capture_date_today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// MIME type for an uploaded file, by extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
