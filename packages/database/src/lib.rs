#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Destination storage for scraped books.
//!
//! Books are stored in a single `books` table inside an embedded `DuckDB`
//! file. The table is provisioned idempotently by [`books_db::create_table`]
//! and rows are written one parameterized `INSERT` per record.

pub mod books_db;
pub mod paths;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// `DuckDB` query or connection error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// I/O error (creating the data directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
