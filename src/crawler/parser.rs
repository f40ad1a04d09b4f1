//! HTML parser for listing and dataset pages
//!
//! This module pulls two shapes of data out of the portal's markup:
//! - Listing pages: dataset links plus the "next page" link
//! - Dataset pages: the dataset title and its downloadable resource rows
//!
//! The selectors come from configuration; nothing here knows a particular
//! portal's layout.

use crate::config::{parse_selector, SelectorConfig};
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Compiled CSS selectors for both page shapes
#[derive(Debug, Clone)]
pub struct PageSelectors {
    listing_target: Selector,
    listing_next: Selector,
    detail_title: Selector,
    detail_row: Selector,
    row_format: Selector,
    row_link: Selector,
    row_description: Selector,
}

impl PageSelectors {
    /// Compiles every configured selector
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            listing_target: parse_selector(&config.listing_target)?,
            listing_next: parse_selector(&config.listing_next)?,
            detail_title: parse_selector(&config.detail_title)?,
            detail_row: parse_selector(&config.detail_row)?,
            row_format: parse_selector(&config.row_format)?,
            row_link: parse_selector(&config.row_link)?,
            row_description: parse_selector(&config.row_description)?,
        })
    }
}

/// Extracted contents of one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Dataset page links, absolute, in document order
    pub targets: Vec<Url>,

    /// Absolute link to the following listing page, if any
    pub next_page: Option<Url>,
}

/// Extracted contents of one dataset page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPage {
    /// Dataset title, `None` when missing or blank
    pub title: Option<String>,

    /// Rows whose format is one of the accepted types
    pub rows: Vec<ResourceRow>,
}

/// One downloadable resource row on a dataset page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRow {
    /// Trimmed description cell, `None` when blank
    pub description: Option<String>,

    /// Absolute download link
    pub link: Option<Url>,

    /// Lowercased format label that matched
    pub format: String,
}

/// Parses a listing page
///
/// # Example
///
/// ```
/// use dataset_mirror::config::SelectorConfig;
/// use dataset_mirror::crawler::{parse_listing, PageSelectors};
/// use url::Url;
///
/// let selectors = PageSelectors::compile(&SelectorConfig::default()).unwrap();
/// let html = r#"<div class="results"><div class="result"><div class="result-title">
///     <a href="/dataset/parks">Parks</a></div></div></div>"#;
/// let base = Url::parse("https://portal.example.com/search").unwrap();
///
/// let page = parse_listing(html, &base, &selectors);
/// assert_eq!(page.targets[0].as_str(), "https://portal.example.com/dataset/parks");
/// assert!(page.next_page.is_none());
/// ```
pub fn parse_listing(html: &str, base_url: &Url, selectors: &PageSelectors) -> ListingPage {
    let document = Html::parse_document(html);

    let mut targets = Vec::new();
    for element in document.select(&selectors.listing_target) {
        if let Some(url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        {
            if !targets.contains(&url) {
                targets.push(url);
            }
        }
    }

    let next_page = document
        .select(&selectors.listing_next)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| resolve_link(href, base_url));

    ListingPage { targets, next_page }
}

/// Parses a dataset page, keeping only rows in one of `valid_types`
///
/// A row is kept when its lowercased format label equals an accepted type
/// and its link ends with `.<format>`.
pub fn parse_detail(
    html: &str,
    base_url: &Url,
    selectors: &PageSelectors,
    valid_types: &[String],
) -> DetailPage {
    let document = Html::parse_document(html);

    let title = document
        .select(&selectors.detail_title)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty());

    let rows = document
        .select(&selectors.detail_row)
        .filter_map(|row| parse_row(row, base_url, selectors, valid_types))
        .collect();

    DetailPage { title, rows }
}

fn parse_row(
    row: ElementRef<'_>,
    base_url: &Url,
    selectors: &PageSelectors,
    valid_types: &[String],
) -> Option<ResourceRow> {
    let format_text = row
        .select(&selectors.row_format)
        .map(element_text)
        .collect::<String>()
        .to_lowercase();
    let href = row
        .select(&selectors.row_link)
        .next()
        .and_then(|link| link.value().attr("href"))?;

    let format = valid_types.iter().find(|t| **t == format_text)?;
    if !href.ends_with(&format!(".{}", format)) {
        return None;
    }

    let description = row
        .select(&selectors.row_description)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty());

    Some(ResourceRow {
        description,
        link: resolve_link(href, base_url),
        format: format.clone(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => Some(absolute_url),
        _ => None,
    }
}
