use serde::Deserialize;
use std::time::Duration;

use crate::crawler::RetryPolicy;

/// Main configuration structure for Dataset-Mirror
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Crawler and download behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// First listing page of the portal
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Number of workers draining each pool stage
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Retry budget for listing page fetches
    #[serde(rename = "listing-retries", default = "default_listing_retries")]
    pub listing_retries: u32,

    /// Retry budget for dataset detail page fetches
    #[serde(rename = "detail-retries", default = "default_retries")]
    pub detail_retries: u32,

    /// Retry budget for file downloads
    #[serde(rename = "file-retries", default = "default_retries")]
    pub file_retries: u32,

    /// Fixed delay before each retry (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Delay between consecutive listing pages (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// File formats worth mirroring (matched against the row format label)
    #[serde(rename = "valid-types", default = "default_valid_types")]
    pub valid_types: Vec<String>,
}

impl CrawlerConfig {
    /// Retry policy for listing page fetches
    pub fn listing_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.listing_retries, self.retry_delay())
    }

    /// Retry policy for dataset detail page fetches
    pub fn detail_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.detail_retries, self.retry_delay())
    }

    /// Retry policy for file downloads
    pub fn file_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.file_retries, self.retry_delay())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory for downloaded files
    #[serde(rename = "data-dir")]
    pub data_dir: String,

    /// Where the crawled dataset list is written as JSON
    #[serde(rename = "datasets-path")]
    pub datasets_path: String,
}

/// Remote object store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// S3-compatible endpoint URL
    pub endpoint: String,

    #[serde(default = "default_region")]
    pub region: String,

    pub bucket: String,

    /// Prepended verbatim to every object key
    #[serde(default)]
    pub prefix: String,

    /// Environment variable holding the access key id
    #[serde(rename = "access-key-env", default = "default_access_key_env")]
    pub access_key_env: String,

    /// Environment variable holding the secret access key
    #[serde(rename = "secret-key-env", default = "default_secret_key_env")]
    pub secret_key_env: String,
}

/// CSS selectors used to pick data out of the portal's markup
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// Dataset links on a listing page
    #[serde(rename = "listing-target", default = "default_listing_target")]
    pub listing_target: String,

    /// "Next page" link on a listing page
    #[serde(rename = "listing-next", default = "default_listing_next")]
    pub listing_next: String,

    /// Dataset title on a detail page
    #[serde(rename = "detail-title", default = "default_detail_title")]
    pub detail_title: String,

    /// Resource rows on a detail page
    #[serde(rename = "detail-row", default = "default_detail_row")]
    pub detail_row: String,

    /// Format label within a row
    #[serde(rename = "row-format", default = "default_row_format")]
    pub row_format: String,

    /// Download link within a row
    #[serde(rename = "row-link", default = "default_row_link")]
    pub row_link: String,

    /// Description cell within a row
    #[serde(rename = "row-description", default = "default_row_description")]
    pub row_description: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_target: default_listing_target(),
            listing_next: default_listing_next(),
            detail_title: default_detail_title(),
            detail_row: default_detail_row(),
            row_format: default_row_format(),
            row_link: default_row_link(),
            row_description: default_row_description(),
        }
    }
}

fn default_concurrency() -> usize {
    5
}

fn default_listing_retries() -> u32 {
    5
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_valid_types() -> Vec<String> {
    vec!["csv".to_string(), "json".to_string(), "pdf".to_string()]
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_access_key_env() -> String {
    "STORE_ACCESS_KEY_ID".to_string()
}

fn default_secret_key_env() -> String {
    "STORE_SECRET_ACCESS_KEY".to_string()
}

fn default_listing_target() -> String {
    "div.results div.result div.result-title a".to_string()
}

fn default_listing_next() -> String {
    "div.pager-container > div.pager > a:last-of-type".to_string()
}

fn default_detail_title() -> String {
    "h2.package-title".to_string()
}

fn default_detail_row() -> String {
    "div.container table tbody tr".to_string()
}

fn default_row_format() -> String {
    "td span.format".to_string()
}

fn default_row_link() -> String {
    "td a[data-action=Download], a[data-action=Open]".to_string()
}

fn default_row_description() -> String {
    "td:first-child".to_string()
}
