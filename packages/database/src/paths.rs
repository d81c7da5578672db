//! Canonical file paths for the `DuckDB` data directory.

use std::path::{Path, PathBuf};

/// Environment variable that overrides the database file location.
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
///
/// # Panics
///
/// Panics if the project root cannot be resolved.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the default books database path, `data/books.duckdb`.
#[must_use]
pub fn default_db_path() -> PathBuf {
    data_dir().join("books.duckdb")
}

/// Returns the database path from `DATABASE_PATH`, if set and non-empty.
#[must_use]
pub fn db_path_from_env() -> Option<PathBuf> {
    std::env::var(DATABASE_PATH_ENV)
        .ok()
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
}

/// Returns `configured`, or [`default_db_path`] when nothing is configured.
///
/// The `DATABASE_PATH` override is applied when a job configuration is
/// loaded, not here, so an explicitly configured path is always honored.
#[must_use]
pub fn resolve_db_path(configured: Option<&Path>) -> PathBuf {
    configured.map_or_else(default_db_path, Path::to_path_buf)
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
