//! Runs the job's steps in order with whole-step retries.

use std::sync::Arc;
use std::time::Instant;

use book_etl_scraper::progress::ScrapeProgress;
use chrono::{DateTime, Utc};

use crate::IngestError;
use crate::config::JobConfig;
use crate::steps::{self, Step, StepOutcome};
use crate::task_results::TaskResults;

/// What one successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub job_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Cleaned records published by the fetch step.
    pub books_fetched: usize,
    /// Rows written by the insert step.
    pub books_inserted: u64,
    /// Attempts each step needed, in execution order.
    pub attempts: Vec<(Step, u32)>,
}

/// Runs every step once, in order, against a fresh [`TaskResults`].
///
/// Each step is retried as a whole up to `schedule.retries` more times,
/// waiting `schedule.retry_delay_secs` between attempts. A step that
/// exhausts its retries ends the run; later steps do not run.
///
/// # Errors
///
/// Returns [`IngestError::StepFailed`] wrapping the last error of the step
/// that gave up.
pub async fn run_job(
    config: &JobConfig,
    progress: Arc<dyn ScrapeProgress>,
) -> Result<RunSummary, IngestError> {
    let start = Instant::now();
    let mut summary = RunSummary {
        job_id: config.id.clone(),
        started_at: Utc::now(),
        finished_at: Utc::now(),
        books_fetched: 0,
        books_inserted: 0,
        attempts: Vec::with_capacity(Step::ALL.len()),
    };
    let mut results = TaskResults::new();

    log::info!("Starting job {}", config.id);

    for step in Step::ALL {
        let (outcome, attempts) = run_with_retries(step, config, &mut results, &progress).await?;
        summary.attempts.push((step, attempts));

        match outcome {
            StepOutcome::Fetched(count) => summary.books_fetched = count,
            StepOutcome::TableReady => {}
            StepOutcome::Inserted(count) => summary.books_inserted = count,
        }
    }

    summary.finished_at = Utc::now();
    log::info!(
        "Job {} finished in {:.1}s: {} fetched, {} inserted",
        config.id,
        start.elapsed().as_secs_f64(),
        summary.books_fetched,
        summary.books_inserted,
    );

    Ok(summary)
}

/// Runs `step` until it succeeds or has failed `retries + 1` times.
///
/// Returns the step's outcome and the number of attempts it took.
///
/// # Errors
///
/// Returns [`IngestError::StepFailed`] once the retries are used up.
pub async fn run_with_retries(
    step: Step,
    config: &JobConfig,
    results: &mut TaskResults,
    progress: &Arc<dyn ScrapeProgress>,
) -> Result<(StepOutcome, u32), IngestError> {
    let retries = config.schedule.retries;
    let max_attempts = retries.saturating_add(1);
    let delay = config.schedule.retry_delay();
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        log::info!("Running {step} (attempt {attempt}/{max_attempts})");

        match steps::run_step(step, config, results, progress).await {
            Ok(outcome) => {
                log::info!("{step} succeeded");
                return Ok((outcome, attempt));
            }
            Err(e) if attempt < max_attempts => {
                log::warn!(
                    "{step} failed (attempt {attempt}/{max_attempts}), retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                log::error!("{step} failed after {attempt} attempt(s), giving up: {e}");
                return Err(IngestError::StepFailed {
                    step,
                    attempts: attempt,
                    source: Box::new(e),
                });
            }
        }
    }
}
