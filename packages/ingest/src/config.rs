//! Job configuration.
//!
//! The default job is baked into the binary at compile time via
//! [`include_str!`]; `--config` swaps in a different TOML file with the
//! same shape. Every table except `[schedule]` may be omitted, in which
//! case the scraper and cleaner defaults apply.

use std::path::{Path, PathBuf};
use std::time::Duration;

use book_etl_clean::CleanConfig;
use book_etl_database::paths;
use book_etl_scraper::SiteConfig;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use crate::IngestError;

/// The embedded default job definition.
pub const DEFAULT_JOB_TOML: &str = include_str!("../job.toml");

/// One scrape, clean, and load job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobConfig {
    /// Job identifier, used in log lines.
    pub id: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// When and how persistently to run.
    pub schedule: ScheduleConfig,
    /// Where the books table lives.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// What to scrape.
    #[serde(default)]
    pub site: SiteConfig,
    /// How to clean it.
    #[serde(default)]
    pub clean: CleanConfig,
}

/// Run timing and retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    /// First scheduled run.
    pub start_date: DateTime<Utc>,
    /// Days between scheduled runs.
    #[serde(default = "default_interval_days")]
    pub interval_days: u32,
    /// Extra attempts per step after the first failure.
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Fixed wait between attempts of the same step.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

const fn default_interval_days() -> u32 {
    1
}

const fn default_retries() -> u32 {
    5
}

const fn default_retry_delay_secs() -> u64 {
    60
}

impl ScheduleConfig {
    /// Time between scheduled runs. Never shorter than one day.
    #[must_use]
    pub fn interval(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.interval_days.max(1)))
    }

    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// Database file. `None` means [`paths::default_db_path`].
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    /// The database file this job writes to.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        paths::resolve_db_path(self.path.as_deref())
    }
}

impl JobConfig {
    /// Parses a job definition from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Config`] if the TOML is malformed or does not
    /// match the job shape.
    pub fn parse(toml_str: &str) -> Result<Self, IngestError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Loads the job from `path`, or the embedded default when `path` is
    /// `None`, then applies the `DATABASE_PATH` override.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Io`] if the file cannot be read, or
    /// [`IngestError::Config`] if it cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, IngestError> {
        let config = match path {
            Some(path) => {
                log::debug!("Loading job config from {}", path.display());
                let text = std::fs::read_to_string(path)?;
                Self::parse(&text)?
            }
            None => Self::parse(DEFAULT_JOB_TOML)?,
        };

        Ok(config.with_database_override(paths::db_path_from_env()))
    }

    /// Replaces the configured database path with `path` when one is given.
    #[must_use]
    pub fn with_database_override(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            log::debug!("Database path overridden to {}", path.display());
            self.database.path = Some(path);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    #[test]
    fn embedded_default_parses() {
        let config = JobConfig::parse(DEFAULT_JOB_TOML).unwrap();

        assert_eq!(config.id, "fetch_and_store_books_data");
        assert_eq!(
            config.schedule.start_date,
            Utc.with_ymd_and_hms(2024, 11, 23, 0, 0, 0).unwrap()
        );
        assert_eq!(config.schedule.interval(), TimeDelta::days(1));
        assert_eq!(config.schedule.retries, 5);
        assert_eq!(config.schedule.retry_delay(), Duration::from_secs(60));
        assert_eq!(config.database.path, None);
        assert_eq!(config.site.timeout_secs, Some(30));
        assert_eq!(config.clean.currency_symbol, "$");
    }

    #[test]
    fn embedded_site_matches_scraper_defaults() {
        let config = JobConfig::load(None).unwrap();
        let defaults = SiteConfig::default();

        assert_eq!(config.site.search_url, defaults.search_url);
        assert_eq!(config.site.site_root, defaults.site_root);
        assert_eq!(config.site.link_selector, defaults.link_selector);
        assert_eq!(config.site.headers, defaults.headers);
        assert_eq!(config.site.selectors, defaults.selectors);
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let config = JobConfig::parse(
            r#"
            id = "tiny"

            [schedule]
            start_date = "2025-01-01T06:00:00Z"
            "#,
        )
        .unwrap();

        assert_eq!(config.description, "");
        assert_eq!(config.schedule.interval_days, 1);
        assert_eq!(config.schedule.retries, 5);
        assert_eq!(config.schedule.retry_delay_secs, 60);
        assert_eq!(config.site, SiteConfig::default());
        assert_eq!(config.clean, CleanConfig::default());
    }

    #[test]
    fn partial_site_table_overrides_only_listed_keys() {
        let config = JobConfig::parse(
            r#"
            id = "local"

            [schedule]
            start_date = "2025-01-01T00:00:00Z"
            retries = 0

            [database]
            path = "/tmp/books.duckdb"

            [site]
            search_url = "http://localhost:8080/s"

            [site.selectors]
            price = "span.price"
            "#,
        )
        .unwrap();

        assert_eq!(config.schedule.retries, 0);
        assert_eq!(
            config.database.path.as_deref(),
            Some(Path::new("/tmp/books.duckdb"))
        );
        assert_eq!(config.site.search_url, "http://localhost:8080/s");
        assert_eq!(config.site.site_root, "https://www.amazon.com");
        assert_eq!(config.site.selectors.price, "span.price");
        assert_eq!(config.site.selectors.title, "span#productTitle");
    }

    #[test]
    fn database_override_replaces_configured_path() {
        let config = JobConfig::parse(DEFAULT_JOB_TOML)
            .unwrap()
            .with_database_override(Some(PathBuf::from("/env/books.duckdb")));

        assert_eq!(config.database.db_path(), PathBuf::from("/env/books.duckdb"));
    }

    #[test]
    fn no_override_keeps_configured_path() {
        let mut config = JobConfig::parse(DEFAULT_JOB_TOML).unwrap();
        config.database.path = Some(PathBuf::from("/tmp/run/books.duckdb"));

        let config = config.with_database_override(None);

        assert_eq!(
            config.database.db_path(),
            PathBuf::from("/tmp/run/books.duckdb")
        );
    }

    #[test]
    fn zero_interval_is_clamped_to_one_day() {
        let schedule = ScheduleConfig {
            start_date: Utc::now(),
            interval_days: 0,
            retries: 0,
            retry_delay_secs: 0,
        };

        assert_eq!(schedule.interval(), TimeDelta::days(1));
    }

    #[test]
    fn missing_schedule_is_rejected() {
        let err = JobConfig::parse(r#"id = "x""#).unwrap_err();
        assert!(matches!(err, IngestError::Config(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JobConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
    }
}
