//! Content digests for local files

use sha2::{Digest, Sha512};
use std::path::{Path, PathBuf};

/// A local file and the digest of its full contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,

    /// Lowercase hex SHA-512 of the file bytes
    pub digest: String,
}

impl FileRecord {
    /// Reads `path` and digests it, returning the bytes alongside the record
    pub async fn load(path: &Path) -> std::io::Result<(Self, Vec<u8>)> {
        let bytes = tokio::fs::read(path).await?;
        let record = Self {
            path: path.to_path_buf(),
            digest: digest_bytes(&bytes),
        };
        Ok((record, bytes))
    }
}

/// Hex-encoded SHA-512 of `bytes`
pub fn digest_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha512::digest(bytes))
}
