//! Paginated listing crawl
//!
//! Starting from a seed listing page, the crawler collects dataset links and
//! follows the "next page" link until there is none or it points at a page
//! this crawl has already fetched. The visited set only ever grows, which is
//! what guarantees termination on a cyclic pager.

use crate::crawler::fetcher::{FetchError, PageFetcher};
use crate::crawler::parser::{parse_listing, PageSelectors};
use crate::crawler::retry::{retry, ExhaustedRetries, RetryPolicy};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Pages visited and targets found during one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlFrontier {
    visited: HashSet<Url>,
    targets: Vec<Url>,
    seen_targets: HashSet<Url>,
}

impl CrawlFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a page as fetched, returning false if it already was
    pub fn mark_visited(&mut self, page: Url) -> bool {
        self.visited.insert(page)
    }

    pub fn is_visited(&self, page: &Url) -> bool {
        self.visited.contains(page)
    }

    /// Adds a target, returning false if it was already known
    pub fn add_target(&mut self, target: Url) -> bool {
        if self.seen_targets.insert(target.clone()) {
            self.targets.push(target);
            true
        } else {
            false
        }
    }

    /// Targets in discovery order, each listed once
    pub fn targets(&self) -> &[Url] {
        &self.targets
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn into_targets(self) -> Vec<Url> {
        self.targets
    }
}

/// Walks a paginated listing and accumulates its dataset links
pub struct FrontierCrawler<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
    selectors: &'a PageSelectors,
    policy: RetryPolicy,
    page_delay: Duration,
}

impl<'a, F: PageFetcher + ?Sized> FrontierCrawler<'a, F> {
    /// Creates a crawler
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Source of listing page bodies
    /// * `selectors` - Compiled listing selectors
    /// * `policy` - Retry policy applied to every listing fetch
    /// * `page_delay` - Politeness pause before following a next link
    pub fn new(
        fetcher: &'a F,
        selectors: &'a PageSelectors,
        policy: RetryPolicy,
        page_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            selectors,
            policy,
            page_delay,
        }
    }

    /// Crawls from `seed` until the pager runs out or loops back
    ///
    /// # Errors
    ///
    /// Fails when any listing page still cannot be fetched after the retry
    /// budget; the partial frontier is discarded.
    pub async fn crawl(&self, seed: Url) -> Result<CrawlFrontier, ExhaustedRetries<FetchError>> {
        let mut frontier = CrawlFrontier::new();
        let mut current = Some(seed);

        while let Some(page) = current.take() {
            frontier.mark_visited(page.clone());

            let body = retry(&self.policy, page.as_str(), || self.fetcher.fetch_page(&page)).await?;
            let listing = parse_listing(&body, &page, self.selectors);

            let found = listing.targets.len();
            let added = listing
                .targets
                .into_iter()
                .filter(|target| frontier.add_target(target.clone()))
                .count();
            tracing::info!(
                "Listing page {}: {} datasets ({} new)",
                page,
                found,
                added
            );

            match listing.next_page {
                Some(next) if frontier.is_visited(&next) => {
                    tracing::debug!("Next page {} already visited, stopping", next);
                }
                Some(next) => {
                    tokio::time::sleep(self.page_delay).await;
                    current = Some(next);
                }
                None => tracing::debug!("No next page after {}", page),
            }
        }

        tracing::info!(
            "Crawl finished: {} listing pages, {} datasets",
            frontier.visited_count(),
            frontier.targets().len()
        );

        Ok(frontier)
    }
}
