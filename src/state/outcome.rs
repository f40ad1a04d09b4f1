//! Per-item outcomes produced by the pipeline stages

use std::fmt;

/// What happened to one dataset or one of its files
///
/// Everything except `Success` is a soft failure: it is counted and the
/// affected item is skipped, but sibling items keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatasetOutcome {
    /// A file was downloaded to disk
    Success,

    /// The detail page has no title
    NoTitle,

    /// A download row has no usable description
    NoDescription,

    /// A download row has no link
    LinkNotFound,

    /// No row on the detail page offers an accepted format
    NoFileFound,

    /// The file download failed after all retries
    ErrorDownloadingFile,

    /// The detail page itself could not be fetched after all retries
    ErrorFetchingDataset,
}

impl DatasetOutcome {
    /// Stable snake_case name, used in logs and the summary
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoTitle => "no_title",
            Self::NoDescription => "no_description",
            Self::LinkNotFound => "link_not_found",
            Self::NoFileFound => "no_file_found",
            Self::ErrorDownloadingFile => "error_downloading_file",
            Self::ErrorFetchingDataset => "error_fetching_dataset",
        }
    }

    /// Returns true for every outcome other than `Success`
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Success)
    }

    /// All outcomes in summary order
    pub fn all() -> [Self; 7] {
        [
            Self::Success,
            Self::NoTitle,
            Self::NoDescription,
            Self::LinkNotFound,
            Self::NoFileFound,
            Self::ErrorDownloadingFile,
            Self::ErrorFetchingDataset,
        ]
    }
}

impl fmt::Display for DatasetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of syncing one local file to the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Content and hash marker were written
    Uploaded { content_key: String },

    /// The remote hash marker already matched
    Unchanged,
}
