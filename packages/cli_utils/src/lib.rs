#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal wiring for the book ETL binaries.
//!
//! [`init_logger`] installs `pretty_env_logger` behind
//! `indicatif-log-bridge`, so `log::info!` output is suspended while a
//! progress bar redraws. [`IndicatifProgress`] renders the scraper's
//! per-page events.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use book_etl_scraper::progress::{PageOutcome, ScrapeProgress};
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// Renders [`ScrapeProgress`] events as an `indicatif` bar over detail
/// pages, counting skipped pages separately.
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Style used once the number of detail links is known.
    bar_style: ProgressStyle,
    skipped: AtomicU64,
}

impl IndicatifProgress {
    /// Creates the detail-page bar. It spins while the search page loads
    /// and becomes a bar once [`ScrapeProgress::links_found`] arrives.
    #[must_use]
    pub fn pages_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ScrapeProgress> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let bar_style = ProgressStyle::with_template(
            "  {wide_msg} {bar:30.cyan/dim} {pos}/{len} pages [{eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Arc::new(Self {
            bar,
            bar_style,
            skipped: AtomicU64::new(0),
        })
    }
}

impl ScrapeProgress for IndicatifProgress {
    fn links_found(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style.clone());
        self.skipped.store(0, Ordering::Relaxed);
    }

    fn page_started(&self, url: &str) {
        self.bar.set_message(url.to_string());
    }

    fn page_finished(&self, _url: &str, outcome: PageOutcome) {
        if outcome == PageOutcome::Skipped {
            self.skipped.fetch_add(1, Ordering::Relaxed);
        }
        self.bar.inc(1);
    }

    fn search_failed(&self, url: &str) {
        self.bar
            .abandon_with_message(format!("Search page {url} could not be retrieved"));
    }

    fn finished(&self, records: usize) {
        let skipped = self.skipped.load(Ordering::Relaxed);
        self.bar.finish_with_message(if skipped == 0 {
            format!("Scraped {records} books")
        } else {
            format!("Scraped {records} books ({skipped} pages skipped)")
        });
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge`.
///
/// Reads the filter from `RUST_LOG`, defaulting to `info` when unset.
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.filter_level(log::LevelFilter::Info),
    };
    let logger = builder.build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Already set (e.g. in tests)

    log::set_max_level(level);

    multi
}
