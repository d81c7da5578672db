#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the book ETL job.

use std::path::PathBuf;

use book_etl_cli_utils::IndicatifProgress;
use book_etl_database::books_db;
use book_etl_ingest::schedule::{next_run_at, run_schedule};
use book_etl_ingest::{JobConfig, run_job, steps};
use chrono::Utc;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "book_etl_ingest", about = "Book listing scrape, clean, and load job")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole job once, now
    Run {
        /// Job TOML to use instead of the built-in default
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run the job on its schedule until Ctrl-C
    Schedule {
        /// Job TOML to use instead of the built-in default
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Create the books table if it does not exist
    CreateTable {
        /// Job TOML to use instead of the built-in default
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print stored books
    Books {
        /// Job TOML to use instead of the built-in default
        #[arg(long)]
        config: Option<PathBuf>,
        /// Maximum number of rows to print
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Print the resolved job configuration
    Config {
        /// Job TOML to use instead of the built-in default
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = book_etl_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            let config = JobConfig::load(config.as_deref())?;
            let progress = IndicatifProgress::pages_bar(&multi, "Fetching search results...");
            let summary = run_job(&config, progress).await?;

            println!(
                "{}: fetched {}, inserted {} ({} -> {})",
                summary.job_id,
                summary.books_fetched,
                summary.books_inserted,
                summary.started_at.format("%Y-%m-%d %H:%M:%S"),
                summary.finished_at.format("%H:%M:%S"),
            );
        }
        Commands::Schedule { config } => {
            let config = JobConfig::load(config.as_deref())?;
            run_schedule(config, move || {
                IndicatifProgress::pages_bar(&multi, "Fetching search results...")
            })
            .await?;
        }
        Commands::CreateTable { config } => {
            let config = JobConfig::load(config.as_deref())?;
            steps::create_table(&config)?;
        }
        Commands::Books { config, limit } => {
            let config = JobConfig::load(config.as_deref())?;
            let conn = books_db::open(&config.database.db_path())?;
            if !books_db::table_exists(&conn)? {
                println!("No books table yet. Run `create-table` or `run` first.");
                return Ok(());
            }

            let books = books_db::fetch_books(&conn, limit)?;
            println!(
                "{:<6} {:<50} {:<25} {:<10} {:<16} AVAILABILITY",
                "ID", "TITLE", "AUTHOR", "PRICE", "RATING"
            );
            println!("{}", "-".repeat(120));
            for book in &books {
                let r = &book.record;
                println!(
                    "{:<6} {:<50} {:<25} {:<10} {:<16} {}",
                    book.id,
                    truncate(r.title.as_deref().unwrap_or("-"), 50),
                    truncate(r.author.as_deref().unwrap_or("-"), 25),
                    r.price.as_deref().unwrap_or("-"),
                    r.rating.as_deref().unwrap_or("-"),
                    r.availability.as_deref().unwrap_or("-"),
                );
            }
            println!("{} of {} books", books.len(), books_db::count_books(&conn)?);
        }
        Commands::Config { config } => {
            let config = JobConfig::load(config.as_deref())?;
            let next = next_run_at(
                config.schedule.start_date,
                config.schedule.interval(),
                Utc::now(),
            );

            println!("{:<16} {}", "id", config.id);
            println!("{:<16} {}", "description", config.description);
            println!("{:<16} {}", "start_date", config.schedule.start_date);
            println!("{:<16} {} day(s)", "interval", config.schedule.interval().num_days());
            println!("{:<16} {}", "next_run", next);
            println!("{:<16} {}", "retries", config.schedule.retries);
            println!("{:<16} {}s", "retry_delay", config.schedule.retry_delay_secs);
            println!("{:<16} {}", "database", config.database.db_path().display());
            println!("{:<16} {}", "search_url", config.site.search_url);
            println!("{:<16} {}", "site_root", config.site.site_root);
            println!("{:<16} {}", "link_selector", config.site.link_selector);
            for (name, value) in &config.site.headers {
                println!("{:<16} {name}: {value}", "header");
            }
            for field in book_etl_book_models::BookField::ALL {
                println!(
                    "{:<16} {}",
                    format!("selector.{field}"),
                    config.site.selectors.get(field)
                );
            }
            println!("{:<16} {}", "currency_symbol", config.clean.currency_symbol);
        }
    }

    Ok(())
}

/// Shortens `s` to at most `max` characters, marking the cut with `...`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
