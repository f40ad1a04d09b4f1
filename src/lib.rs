//! Dataset-Mirror: an archiver for open-data portals
//!
//! This crate crawls a paginated dataset listing, extracts downloadable files
//! from each dataset page, fetches them with a bounded worker pool and mirrors
//! them to an S3-compatible store, uploading only files whose content digest
//! changed since the last run.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod sync;

use thiserror::Error;

/// Main error type for Dataset-Mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Listing crawl failed: {0}")]
    Crawl(#[from] crawler::ExhaustedRetries<crawler::FetchError>),

    #[error("Worker pool error: {0}")]
    Pool(#[from] crawler::PoolError),

    #[error("Store error: {0}")]
    Store(#[from] sync::StoreError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Missing environment variable: {0}")]
    MissingEnv(String),
}

/// Result type alias for Dataset-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, RunReport};
pub use state::{DatasetOutcome, StatusTally, SyncOutcome};
pub use sync::{ContentSync, MemoryStore, ObjectStore, S3Store};
