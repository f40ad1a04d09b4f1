//! Remote object key layout
//!
//! Content objects live under a capture date so every changed version is
//! kept; the hash marker sits at a fixed key per logical file so a single
//! read answers whether the remote copy is current.
//!
//! ```text
//! <prefix><dataset>/<YYYY-MM-DD>/<file-name>   content
//! <prefix><dataset>/<file-name>.sha512         hash marker
//! ```

/// Suffix appended to a file name to form its hash marker key
pub const HASH_MARKER_SUFFIX: &str = ".sha512";

/// Both keys for one logical file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteKeys {
    /// Stable across runs
    pub hash_key: String,

    /// Changes with the capture date
    pub content_key: String,
}

impl RemoteKeys {
    /// Derives the keys for `file_name` within `dataset`
    pub fn new(prefix: &str, dataset: &str, file_name: &str, capture_date: &str) -> Self {
        let dataset = sanitize_segment(dataset);
        let file_name = sanitize_segment(file_name);

        Self {
            hash_key: format!("{}{}/{}{}", prefix, dataset, file_name, HASH_MARKER_SUFFIX),
            content_key: format!("{}{}/{}/{}", prefix, dataset, capture_date, file_name),
        }
    }
}

/// Makes a string safe to use as a single key or path segment
///
/// Path separators become `-` and surrounding whitespace is dropped.
pub fn sanitize_segment(segment: &str) -> String {
    segment
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '-',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
