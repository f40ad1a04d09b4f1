//! Crawler module for listing discovery and file retrieval
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and streamed downloads
//! - Fixed-delay retry around unreliable network calls
//! - A bounded worker pool for per-item work
//! - Paginated listing crawl with a visited-set guard
//! - HTML extraction of dataset links and download rows
//! - Overall pipeline coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod pool;
mod retry;

pub use coordinator::{
    fetch_dataset, plan_downloads, Coordinator, DatasetPlan, DownloadRequest, RunReport,
};
pub use fetcher::{build_http_client, FetchError, HttpFetcher, PageFetcher};
pub use frontier::{CrawlFrontier, FrontierCrawler};
pub use parser::{
    parse_detail, parse_listing, resolve_link, DetailPage, ListingPage, PageSelectors, ResourceRow,
};
pub use pool::{PoolError, WorkerPool};
pub use retry::{retry, ExhaustedRetries, RetryPolicy};
