//! Content-addressed synchronization to a remote object store
//!
//! This module contains:
//! - SHA-512 digests of downloaded files
//! - The remote key layout (dated content keys, stable hash markers)
//! - The `ObjectStore` seam with S3 and in-memory implementations
//! - The hash-gated sync step itself

mod content;
mod digest;
mod keys;
mod s3;
mod store;

pub use content::{
    capture_date_today, content_type_for, ContentSync, FileSyncResult, LocalFile, SyncError,
};
pub use digest::{digest_bytes, FileRecord};
pub use keys::{sanitize_segment, RemoteKeys, HASH_MARKER_SUFFIX};
pub use s3::S3Store;
pub use store::{MemoryStore, ObjectStore, StoreError, StoredObject};
