//! Crawler coordinator - end-to-end mirror pipeline
//!
//! A run goes through four stages:
//! - Crawl the paginated listing into a list of dataset pages
//! - Fetch every dataset page and turn its rows into download requests
//! - Download the requested files to the data directory
//! - Mirror the downloaded files to the remote store
//!
//! The last three stages go through the worker pool. Every stage hands back
//! outcomes that are folded into a [`StatusTally`], so soft failures are
//! counted and skipped instead of aborting the run. Only a listing page that
//! stays unreachable after its retries ends the run with an error.

use crate::config::Config;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::frontier::FrontierCrawler;
use crate::crawler::parser::{parse_detail, DetailPage, PageSelectors};
use crate::crawler::pool::WorkerPool;
use crate::crawler::retry::{retry, RetryPolicy};
use crate::output::write_datasets;
use crate::state::{DatasetOutcome, StatusTally};
use crate::sync::{capture_date_today, sanitize_segment, ContentSync, FileSyncResult, LocalFile};
use crate::sync::ObjectStore;
use crate::Result;
use std::path::{Path, PathBuf};
use url::Url;

/// One file to fetch from a dataset page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: Url,

    /// Local path the body is streamed to
    pub destination: PathBuf,

    /// Sanitized dataset title, used as the remote grouping
    pub dataset: String,

    pub file_name: String,
}

impl DownloadRequest {
    fn into_local_file(self) -> LocalFile {
        LocalFile::new(self.destination, self.dataset, self.file_name)
    }
}

/// What a dataset page produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetPlan {
    /// Soft failures found while reading the page
    pub outcomes: Vec<DatasetOutcome>,

    pub downloads: Vec<DownloadRequest>,
}

/// Everything a run produced
#[derive(Debug, Default)]
pub struct RunReport {
    pub tally: StatusTally,

    /// Dataset pages that were processed
    pub targets: Vec<Url>,

    /// Files now on disk
    pub downloaded: Vec<LocalFile>,

    /// Per-file sync results, empty when no store was given
    pub synced: Vec<FileSyncResult>,
}

/// Main pipeline coordinator
pub struct Coordinator {
    config: Config,
    fetcher: HttpFetcher,
    selectors: PageSelectors,
    pool: WorkerPool,
    seed: Url,
    capture_date: String,
}

impl Coordinator {
    /// Creates a coordinator from a validated configuration
    ///
    /// The capture date used for remote keys is fixed here, once per run.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built, a selector does not parse,
    /// the seed URL is invalid, or concurrency is zero.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&config.user_agent)?;
        let selectors = PageSelectors::compile(&config.selectors)?;
        let pool = WorkerPool::new(config.crawler.concurrency)?;
        let seed = Url::parse(&config.crawler.seed_url)?;

        Ok(Self {
            config,
            fetcher,
            selectors,
            pool,
            seed,
            capture_date: capture_date_today(),
        })
    }

    /// Overrides the capture date used in content keys
    pub fn with_capture_date(mut self, capture_date: impl Into<String>) -> Self {
        self.capture_date = capture_date.into();
        self
    }

    pub fn capture_date(&self) -> &str {
        &self.capture_date
    }

    /// Crawls the listing, then downloads and mirrors every dataset found
    pub async fn run(&self, store: Option<&dyn ObjectStore>) -> Result<RunReport> {
        let targets = self.discover().await?;
        Ok(self.run_targets(targets, store).await)
    }

    /// Crawls the listing and persists the dataset URLs it found
    ///
    /// # Errors
    ///
    /// Fails when a listing page is still unreachable after its retries, or
    /// when the target list cannot be written.
    pub async fn discover(&self) -> Result<Vec<Url>> {
        tracing::info!("Crawling listing from {}", self.seed);

        let crawler = FrontierCrawler::new(
            &self.fetcher,
            &self.selectors,
            self.config.crawler.listing_policy(),
            self.config.crawler.page_delay(),
        );
        let frontier = crawler.crawl(self.seed.clone()).await?;

        tracing::info!(
            "Crawl finished: {} listing pages, {} datasets",
            frontier.visited_count(),
            frontier.targets().len()
        );

        let targets = frontier.into_targets();
        write_datasets(Path::new(&self.config.output.datasets_path), &targets).await?;
        Ok(targets)
    }

    /// Runs the dataset, download and sync stages over known targets
    ///
    /// With no store the sync stage is skipped.
    pub async fn run_targets(
        &self,
        targets: Vec<Url>,
        store: Option<&dyn ObjectStore>,
    ) -> RunReport {
        let mut tally = StatusTally::new();

        tracing::info!("Reading {} dataset pages", targets.len());
        let plans = self
            .pool
            .run(targets.iter().cloned(), |url| self.process_dataset(url))
            .await;

        let mut requests = Vec::new();
        for plan in plans {
            tally.record_all(plan.outcomes);
            requests.extend(plan.downloads);
        }

        tracing::info!("Downloading {} files", requests.len());
        let downloads = self
            .pool
            .run(requests, |request| self.download(request))
            .await;

        let mut downloaded = Vec::new();
        for (outcome, file) in downloads {
            tally.record(outcome);
            downloaded.extend(file);
        }

        let synced = match store {
            Some(store) => self.sync(store, downloaded.clone()).await,
            None => {
                tracing::info!("No store configured, skipping sync");
                Vec::new()
            }
        };
        for result in &synced {
            tally.record_sync(result.outcome.as_ref().ok());
        }

        RunReport {
            tally,
            targets,
            downloaded,
            synced,
        }
    }

    async fn sync(&self, store: &dyn ObjectStore, files: Vec<LocalFile>) -> Vec<FileSyncResult> {
        tracing::info!(
            "Syncing {} files under capture date {}",
            files.len(),
            self.capture_date
        );
        let sync = ContentSync::new(
            store,
            self.config.store.prefix.clone(),
            self.capture_date.clone(),
        );
        sync.sync_all(&self.pool, files).await
    }

    async fn process_dataset(&self, url: Url) -> DatasetPlan {
        match fetch_dataset(
            &self.fetcher,
            &url,
            &self.selectors,
            &self.config.crawler.detail_policy(),
            &self.config.crawler.valid_types,
        )
        .await
        {
            Some(detail) => {
                let plan = plan_downloads(&detail, Path::new(&self.config.output.data_dir));
                for outcome in &plan.outcomes {
                    tracing::warn!("{}: {}", url, outcome);
                }
                plan
            }
            None => DatasetPlan {
                outcomes: vec![DatasetOutcome::ErrorFetchingDataset],
                downloads: Vec::new(),
            },
        }
    }

    async fn download(&self, request: DownloadRequest) -> (DatasetOutcome, Option<LocalFile>) {
        if let Some(parent) = request.destination.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                tracing::error!("Cannot create {}: {}", parent.display(), e);
                return (DatasetOutcome::ErrorDownloadingFile, None);
            }
        }

        let policy = self.config.crawler.file_policy();
        let result = retry(&policy, request.url.as_str(), || {
            self.fetcher.download_file(&request.url, &request.destination)
        })
        .await;

        match result {
            Ok(bytes) => {
                tracing::info!(
                    "Saved {} ({} bytes)",
                    request.destination.display(),
                    bytes
                );
                (DatasetOutcome::Success, Some(request.into_local_file()))
            }
            Err(e) => {
                tracing::error!("Download of {} failed: {}", request.url, e);
                (DatasetOutcome::ErrorDownloadingFile, None)
            }
        }
    }
}

/// Fetches and parses one dataset page
///
/// Returns None when the page is still unreachable after the retry budget.
pub async fn fetch_dataset<F: PageFetcher + ?Sized>(
    fetcher: &F,
    url: &Url,
    selectors: &PageSelectors,
    policy: &RetryPolicy,
    valid_types: &[String],
) -> Option<DetailPage> {
    match retry(policy, url.as_str(), || fetcher.fetch_page(url)).await {
        Ok(body) => Some(parse_detail(&body, url, selectors, valid_types)),
        Err(e) => {
            tracing::error!("Dataset page {} unavailable: {}", url, e);
            None
        }
    }
}

/// Turns a parsed dataset page into download requests under `data_dir`
///
/// Rows are taken in order. A row without a description or without a link
/// is recorded and ends processing of that page; rows before it still
/// produce requests.
pub fn plan_downloads(detail: &DetailPage, data_dir: &Path) -> DatasetPlan {
    let mut plan = DatasetPlan::default();

    let Some(title) = detail.title.as_deref() else {
        plan.outcomes.push(DatasetOutcome::NoTitle);
        return plan;
    };

    if detail.rows.is_empty() {
        plan.outcomes.push(DatasetOutcome::NoFileFound);
        return plan;
    }

    let dataset = sanitize_segment(title);

    for row in &detail.rows {
        let Some(description) = row.description.as_deref().filter(|d| !d.trim().is_empty()) else {
            plan.outcomes.push(DatasetOutcome::NoDescription);
            break;
        };
        let Some(link) = &row.link else {
            plan.outcomes.push(DatasetOutcome::LinkNotFound);
            break;
        };

        let stem = description.trim();
        let stem = stem.strip_suffix('.').unwrap_or(stem);
        let extension = link_extension(link).unwrap_or(&row.format);
        let file_name = format!("{}.{}", sanitize_segment(stem), extension);

        plan.downloads.push(DownloadRequest {
            url: link.clone(),
            destination: data_dir.join(&dataset).join(&file_name),
            dataset: dataset.clone(),
            file_name,
        });
    }

    plan
}

fn link_extension(link: &Url) -> Option<&str> {
    let last = link.path_segments()?.last()?;
    let (_, extension) = last.rsplit_once('.')?;
    (!extension.is_empty()).then_some(extension)
}
