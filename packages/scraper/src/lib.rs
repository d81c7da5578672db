#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Book listing scraper.
//!
//! Fetches a search results page, collects the product links on it
//! ([`listing`]), then fetches every product detail page in order and
//! extracts five fields from each ([`detail`]). The result is a columnar
//! [`BookBatch`] with one record per detail page that could be fetched.
//!
//! Failures are soft: a search page that cannot be retrieved
//! yields an empty batch, a detail page that cannot be retrieved is skipped,
//! and a missing field becomes an empty string. Each of these is logged.

pub mod config;
pub mod detail;
pub mod listing;
pub mod progress;

use std::sync::Arc;
use std::time::Duration;

use book_etl_book_models::BookBatch;
use scraper::Selector;

pub use config::{FieldSelectors, SiteConfig};
use detail::CompiledSelectors;
use progress::{PageOutcome, ScrapeProgress};

/// Errors that can occur while setting up or running a scrape.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status.
        status: reqwest::StatusCode,
    },

    /// A configured CSS selector could not be parsed.
    #[error("invalid CSS selector '{selector}': {message}")]
    Selector {
        /// The offending selector.
        selector: String,
        /// Parser message.
        message: String,
    },

    /// A configured request header is not a valid HTTP header.
    #[error("invalid header '{name}': {message}")]
    Header {
        /// Header name.
        name: String,
        /// Why it was rejected.
        message: String,
    },

    /// A configured URL could not be parsed.
    #[error("invalid URL '{url}': {message}")]
    Url {
        /// The offending URL.
        url: String,
        /// Parser message.
        message: String,
    },
}

/// Parses a CSS selector string, returning a [`ScrapeError`] on failure.
///
/// # Errors
///
/// Returns [`ScrapeError::Selector`] if `selector` is not valid CSS.
pub fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_owned(),
        message: e.to_string(),
    })
}

/// Scraper for one configured site.
///
/// Holds the HTTP client and the compiled selectors. Build one per fetch
/// step invocation; nothing is cached across runs.
#[derive(Debug)]
pub struct BookScraper {
    config: SiteConfig,
    client: reqwest::Client,
    site_root: reqwest::Url,
    link_selector: Selector,
    selectors: CompiledSelectors,
}

impl BookScraper {
    /// Builds the HTTP client and compiles every selector in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if a header, selector, or the site root in
    /// `config` is invalid, or the HTTP client cannot be built.
    pub fn new(config: SiteConfig) -> Result<Self, ScrapeError> {
        let client = build_client(&config)?;
        let site_root = listing::parse_site_root(&config.site_root)?;
        let link_selector = parse_selector(&config.link_selector)?;
        let selectors = CompiledSelectors::compile(&config.selectors)?;

        Ok(Self {
            config,
            client,
            site_root,
            link_selector,
            selectors,
        })
    }

    /// Returns the configuration this scraper was built from.
    #[must_use]
    pub const fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Runs the whole fetch: search page, link discovery, then every detail
    /// page in order.
    ///
    /// Never fails. A search page that cannot be retrieved produces an
    /// empty batch; a detail page that cannot be retrieved is skipped.
    pub async fn fetch_batch(&self, progress: &Arc<dyn ScrapeProgress>) -> BookBatch {
        let mut batch = BookBatch::new();
        let search_url = &self.config.search_url;

        log::info!("Fetching search results from {search_url}");

        let html = match self.get_text(search_url).await {
            Ok(html) => html,
            Err(e) => {
                log::error!("Failed to retrieve the page {search_url}: {e}");
                progress.search_failed(search_url);
                return batch;
            }
        };

        let links = listing::parse_listing(&html, &self.link_selector, &self.site_root);
        log::info!("Found {} candidate detail pages", links.len());
        progress.links_found(links.len() as u64);

        for url in &links {
            progress.page_started(url);
            let outcome = match self.fetch_detail(url).await {
                Ok(html) => {
                    batch.push(detail::parse_detail(&html, &self.selectors));
                    PageOutcome::Parsed
                }
                Err(e) => {
                    log::warn!("Skipping detail page {url}: {e}");
                    PageOutcome::Skipped
                }
            };
            progress.page_finished(url, outcome);
        }

        progress.finished(batch.len());
        log::info!("Scrape complete: {} records", batch.len());

        batch
    }

    /// Fetches a page and requires a success status.
    async fn get_text(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_owned(),
                status,
            });
        }
        Ok(response.text().await?)
    }

    /// Fetches a detail page. Non-success responses are still parsed, so
    /// only transport failures are errors here.
    async fn fetch_detail(&self, url: &str) -> Result<String, ScrapeError> {
        log::debug!("Fetching detail page {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("Detail page {url} returned HTTP {status}");
        }
        Ok(response.text().await?)
    }
}

/// Builds a [`reqwest::Client`] with the configured static headers.
fn build_client(config: &SiteConfig) -> Result<reqwest::Client, ScrapeError> {
    let mut header_map = reqwest::header::HeaderMap::new();
    for (key, value) in &config.headers {
        let name = reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            ScrapeError::Header {
                name: key.clone(),
                message: e.to_string(),
            }
        })?;
        let val = reqwest::header::HeaderValue::from_str(value).map_err(|e| ScrapeError::Header {
            name: key.clone(),
            message: e.to_string(),
        })?;
        header_map.insert(name, val);
    }

    let mut builder = reqwest::Client::builder().default_headers(header_map);
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().map_err(ScrapeError::Http)
}
