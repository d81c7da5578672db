//! Scrape progress events.
//!
//! [`fetch_batch`](crate::BookScraper::fetch_batch) reports what happened to
//! the search page and to each detail page through [`ScrapeProgress`]. The
//! CLI renders these with `indicatif`; tests record them.

use std::sync::Arc;

/// What became of one detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Fetched and parsed into a record (possibly with empty fields).
    Parsed,
    /// Could not be fetched; no record.
    Skipped,
}

/// Receives events while one search page and its detail pages are scraped.
pub trait ScrapeProgress: Send + Sync {
    /// The search page yielded `total` detail links.
    fn links_found(&self, total: u64);

    /// A detail page request is about to be sent.
    fn page_started(&self, url: &str);

    fn page_finished(&self, url: &str, outcome: PageOutcome);

    /// The search page could not be retrieved; no detail pages follow.
    fn search_failed(&self, url: &str);

    /// Every detail page has been visited and `records` were kept.
    fn finished(&self, records: usize);
}

/// Ignores every event.
pub struct NullProgress;

impl ScrapeProgress for NullProgress {
    fn links_found(&self, _total: u64) {}
    fn page_started(&self, _url: &str) {}
    fn page_finished(&self, _url: &str, _outcome: PageOutcome) {}
    fn search_failed(&self, _url: &str) {}
    fn finished(&self, _records: usize) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn ScrapeProgress> {
    Arc::new(NullProgress)
}
