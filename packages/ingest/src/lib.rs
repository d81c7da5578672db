#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Job runner for the book scrape, clean, and load pipeline.
//!
//! A job is three named [`steps::Step`]s run in a fixed order by
//! [`runner::run_job`], each retried as a whole on failure. The fetch step
//! hands its output to the insert step through a per-run
//! [`task_results::TaskResults`]. [`schedule::run_schedule`] repeats the job
//! at a fixed interval on a cron scheduler.

pub mod config;
pub mod runner;
pub mod schedule;
pub mod steps;
pub mod task_results;

use book_etl_database::DbError;
use book_etl_scraper::ScrapeError;
use tokio_cron_scheduler::JobSchedulerError;

pub use config::JobConfig;
pub use runner::{RunSummary, run_job};
pub use steps::Step;

/// Errors that can occur while loading or running a job.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Job TOML could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Task result (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    /// The cron scheduler could not be built, started, or stopped.
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),

    /// The insert step found no published records.
    #[error("No data found")]
    NoData,

    /// A step failed on every attempt.
    #[error("Step {step} failed after {attempts} attempt(s): {source}")]
    StepFailed {
        step: Step,
        attempts: u32,
        #[source]
        source: Box<IngestError>,
    },
}
