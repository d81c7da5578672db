//! The three job steps.
//!
//! ```text
//! fetch_and_transform_data  ->  create_table  ->  insert_data_into_db
//! ```
//!
//! The fetch step hands its cleaned batch to the insert step through the
//! run's [`TaskResults`] under [`BOOK_DATA_KEY`]. Each step opens its own
//! HTTP client or database connection and drops it before returning.

use std::sync::Arc;

use book_etl_book_models::BookRecord;
use book_etl_clean::Cleaner;
use book_etl_database::books_db;
use book_etl_scraper::BookScraper;
use book_etl_scraper::progress::ScrapeProgress;
use serde::Deserialize as _;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::IngestError;
use crate::config::JobConfig;
use crate::task_results::TaskResults;

/// Key the fetch step publishes the cleaned batch under.
pub const BOOK_DATA_KEY: &str = "book_data";

/// A named job step. The names are part of the job's public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Step {
    FetchAndTransformData,
    CreateTable,
    InsertDataIntoDb,
}

impl Step {
    /// Every step, in execution order.
    pub const ALL: [Self; 3] = [
        Self::FetchAndTransformData,
        Self::CreateTable,
        Self::InsertDataIntoDb,
    ];
}

/// What a successful step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Number of cleaned records published.
    Fetched(usize),
    TableReady,
    /// Number of rows written.
    Inserted(u64),
}

/// Runs one attempt of `step`.
///
/// # Errors
///
/// Returns whatever the step itself returns.
pub async fn run_step(
    step: Step,
    config: &JobConfig,
    results: &mut TaskResults,
    progress: &Arc<dyn ScrapeProgress>,
) -> Result<StepOutcome, IngestError> {
    match step {
        Step::FetchAndTransformData => fetch_and_transform_data(config, results, progress)
            .await
            .map(StepOutcome::Fetched),
        Step::CreateTable => create_table(config).map(|()| StepOutcome::TableReady),
        Step::InsertDataIntoDb => insert_data_into_db(config, results).map(StepOutcome::Inserted),
    }
}

/// Scrapes the configured site, cleans the batch, and publishes the rows
/// as JSON under [`BOOK_DATA_KEY`].
///
/// An empty batch is still published; the insert step decides what to do
/// with it.
///
/// Returns the number of records published.
///
/// # Errors
///
/// Returns [`IngestError::Scrape`] if the site configuration is invalid, or
/// [`IngestError::Json`] if the batch cannot be serialized.
pub async fn fetch_and_transform_data(
    config: &JobConfig,
    results: &mut TaskResults,
    progress: &Arc<dyn ScrapeProgress>,
) -> Result<usize, IngestError> {
    let scraper = BookScraper::new(config.site.clone())?;
    let batch = scraper.fetch_batch(progress).await;

    let cleaned = Cleaner::new(config.clean.clone()).clean(batch);
    let records = cleaned.into_records();
    let count = records.len();

    results.push(
        Step::FetchAndTransformData.as_ref(),
        BOOK_DATA_KEY,
        serde_json::to_value(&records)?,
    );
    log::info!("Published {count} cleaned records under '{BOOK_DATA_KEY}'");

    Ok(count)
}

/// Ensures the `books` table exists.
///
/// # Errors
///
/// Returns [`IngestError::Db`] if the database cannot be opened or the DDL
/// fails.
pub fn create_table(config: &JobConfig) -> Result<(), IngestError> {
    let path = config.database.db_path();
    let conn = books_db::open(&path)?;
    books_db::create_table(&conn)?;
    log::info!("Table 'books' is ready in {}", path.display());
    Ok(())
}

/// Inserts the fetch step's published records, one statement per record.
///
/// Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`IngestError::NoData`] if nothing was published or the
/// published batch is empty, [`IngestError::Json`] if it cannot be read
/// back, or [`IngestError::Db`] if an insert fails.
pub fn insert_data_into_db(config: &JobConfig, results: &TaskResults) -> Result<u64, IngestError> {
    let Some(value) = results.pull(Step::FetchAndTransformData.as_ref(), BOOK_DATA_KEY) else {
        return Err(IngestError::NoData);
    };

    let records = Vec::<BookRecord>::deserialize(value)?;
    if records.is_empty() {
        return Err(IngestError::NoData);
    }

    let conn = books_db::open(&config.database.db_path())?;
    Ok(books_db::insert_books(&conn, &records)?)
}
