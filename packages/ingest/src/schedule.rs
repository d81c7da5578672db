//! Fixed-interval scheduling on top of `tokio-cron-scheduler`.
//!
//! Runs happen at `start_date + k * interval_days`. A cron job fires every
//! day at the start date's UTC time of day, and [`is_scheduled_slot`] drops
//! the firings that fall between slots. Missed slots are not backfilled.

use std::sync::Arc;

use book_etl_scraper::progress::ScrapeProgress;
use chrono::{DateTime, TimeDelta, Timelike as _, Utc};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::IngestError;
use crate::config::JobConfig;
use crate::runner::run_job;

const SECS_PER_DAY: i64 = 86_400;

/// Returns the first `start + k * interval` (for `k >= 0`) that is at or
/// after `now`.
///
/// Intervals shorter than one second are treated as one second.
#[must_use]
pub fn next_run_at(start: DateTime<Utc>, interval: TimeDelta, now: DateTime<Utc>) -> DateTime<Utc> {
    if now <= start {
        return start;
    }

    let step_secs = interval.num_seconds().max(1);
    let periods = (now - start).num_seconds() / step_secs;
    let mut next = start + TimeDelta::seconds(periods * step_secs);

    while next < now {
        next += TimeDelta::seconds(step_secs);
    }

    next
}

/// Six-field cron expression (`sec min hour dom mon dow`, UTC) that fires
/// daily at `start`'s time of day.
#[must_use]
pub fn cron_expression(start: DateTime<Utc>) -> String {
    format!("{} {} {} * * *", start.second(), start.minute(), start.hour())
}

/// Whether a daily firing at `fired_at` is one of the job's slots.
///
/// Firings land a moment after the slot, so the offset from `start` is
/// rounded to the nearest whole day.
#[must_use]
pub fn is_scheduled_slot(start: DateTime<Utc>, interval_days: u32, fired_at: DateTime<Utc>) -> bool {
    let offset = (fired_at - start).num_seconds();
    let days = (offset + SECS_PER_DAY / 2).div_euclid(SECS_PER_DAY);
    days >= 0 && days % i64::from(interval_days.max(1)) == 0
}

/// Runs the job at every scheduled slot until Ctrl-C.
///
/// At most one run executes at a time: a slot that fires while the
/// previous run is still going is skipped. A failed run is logged and the
/// schedule carries on; no state is carried between runs. `make_progress`
/// supplies a fresh progress reporter for each run.
///
/// # Errors
///
/// Returns [`IngestError::Scheduler`] if the scheduler cannot be built or
/// started, or [`IngestError::Io`] if the Ctrl-C handler cannot be
/// installed.
pub async fn run_schedule<F>(config: JobConfig, make_progress: F) -> Result<(), IngestError>
where
    F: Fn() -> Arc<dyn ScrapeProgress> + Send + Sync + 'static,
{
    let config = Arc::new(config);
    let make_progress = Arc::new(make_progress);
    let running = Arc::new(Mutex::new(()));
    let expression = cron_expression(config.schedule.start_date);

    let mut scheduler = JobScheduler::new().await?;

    let job_config = Arc::clone(&config);
    let job = Job::new_async(expression.as_str(), move |_uuid, _lock| {
        let config = Arc::clone(&job_config);
        let make_progress = Arc::clone(&make_progress);
        let running = Arc::clone(&running);
        Box::pin(async move {
            let fired_at = Utc::now();
            let schedule = &config.schedule;
            if !is_scheduled_slot(schedule.start_date, schedule.interval_days, fired_at) {
                log::debug!("{}: {fired_at} is not a scheduled slot", config.id);
                return;
            }

            let Ok(_guard) = running.try_lock() else {
                log::warn!(
                    "{}: previous run still in progress, skipping slot {fired_at}",
                    config.id
                );
                return;
            };

            match run_job(&config, make_progress()).await {
                Ok(summary) => log::info!(
                    "Scheduled run at {fired_at} inserted {} books",
                    summary.books_inserted
                ),
                Err(e) => log::error!("Scheduled run at {fired_at} failed: {e}"),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    let next = next_run_at(
        config.schedule.start_date,
        config.schedule.interval(),
        Utc::now(),
    );
    log::info!(
        "Scheduled {} ('{expression}' UTC, every {} day(s)); next run at {next}",
        config.id,
        config.schedule.interval().num_days(),
    );

    tokio::signal::ctrl_c().await?;
    log::info!("Stopping scheduler");
    scheduler.shutdown().await?;

    Ok(())
}
