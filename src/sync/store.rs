//! Remote object store interface
//!
//! The sync step only needs two calls: read an object (or learn that it is
//! absent) and write one publicly readable. Anything S3-shaped fits.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Errors from remote store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {bucket}/{key}: {source}")]
    Read {
        bucket: String,
        key: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to write {bucket}/{key}: {source}")]
    Write {
        bucket: String,
        key: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Minimal object store used by the sync step
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Reads an object, `Ok(None)` when it does not exist
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Writes an object with public-read access
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError>;
}

/// A stored object held by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// In-process store, useful for tests and local experiments
///
/// Records every `put` in order so callers can assert on upload counts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    puts: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the object at `key`
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// All keys currently stored, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Every key written so far, in write order
    pub fn put_log(&self) -> Vec<String> {
        self.puts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forgets the put log, leaving the objects in place
    pub fn clear_put_log(&self) {
        self.puts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.object(key).map(|object| object.body))
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                key.to_string(),
                StoredObject {
                    body,
                    content_type: content_type.to_string(),
                },
            );
        self.puts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key.to_string());
        Ok(())
    }
}
