//! The `books` table.
//!
//! One row per scraped book. `id` is a surrogate key drawn from the
//! `books_id_seq` sequence on insert; the five data columns are nullable
//! text.

use std::path::Path;

use book_etl_book_models::BookRecord;
use duckdb::Connection;

use crate::DbError;

/// A book row as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBook {
    /// Surrogate key assigned on insert.
    pub id: i64,
    /// The stored values.
    pub record: BookRecord,
}

/// Opens (or creates) the books database at `path`.
///
/// The parent directory is created if needed. The table itself is not
/// created here; that is [`create_table`]'s job.
///
/// # Errors
///
/// Returns [`DbError`] if the directory or connection cannot be created.
pub fn open(path: &Path) -> Result<Connection, DbError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        crate::paths::ensure_dir(parent)?;
    }

    log::debug!("Opening books database at {}", path.display());
    Ok(Connection::open(path)?)
}

/// Opens a throwaway in-memory database.
///
/// # Errors
///
/// Returns [`DbError`] if `DuckDB` cannot allocate the database.
pub fn open_in_memory() -> Result<Connection, DbError> {
    Ok(Connection::open_in_memory()?)
}

/// Creates the `books` table and its key sequence if they do not exist.
///
/// Safe to call on every run.
///
/// # Errors
///
/// Returns [`DbError`] if the DDL fails.
pub fn create_table(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE SEQUENCE IF NOT EXISTS books_id_seq START 1;

        CREATE TABLE IF NOT EXISTS books (
            id BIGINT PRIMARY KEY DEFAULT nextval('books_id_seq'),
            title TEXT,
            author TEXT,
            price TEXT,
            rating TEXT,
            availability TEXT
        );",
    )?;

    Ok(())
}

/// Returns whether the `books` table exists.
///
/// # Errors
///
/// Returns [`DbError`] if the catalog query fails.
pub fn table_exists(conn: &Connection) -> Result<bool, DbError> {
    let mut stmt = conn
        .prepare("SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'books'")?;
    let count: i64 = stmt.query_row([], |row| row.get(0))?;
    Ok(count > 0)
}

/// Inserts one book and returns its assigned surrogate key.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
pub fn insert_book(conn: &Connection, book: &BookRecord) -> Result<i64, DbError> {
    let mut stmt = conn.prepare(
        "INSERT INTO books (title, author, price, rating, availability)
         VALUES (?, ?, ?, ?, ?)
         RETURNING id",
    )?;

    let id = stmt.query_row(
        duckdb::params![
            book.title.as_deref(),
            book.author.as_deref(),
            book.price.as_deref(),
            book.rating.as_deref(),
            book.availability.as_deref(),
        ],
        |row| row.get(0),
    )?;

    Ok(id)
}

/// Inserts every book, one statement per record, in order.
///
/// Stops at the first failing insert; rows already written stay written.
///
/// Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`DbError`] from the first insert that fails.
pub fn insert_books(conn: &Connection, books: &[BookRecord]) -> Result<u64, DbError> {
    let mut inserted = 0u64;

    for book in books {
        let id = insert_book(conn, book)?;
        log::debug!("Inserted book {id}: {:?}", book.title);
        inserted += 1;
    }

    log::info!("Inserted {inserted} books");
    Ok(inserted)
}

/// Returns the number of stored books.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn count_books(conn: &Connection) -> Result<u64, DbError> {
    let mut stmt = conn.prepare("SELECT COUNT(*) FROM books")?;
    let count: i64 = stmt.query_row([], |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Returns stored books ordered by key, optionally limited.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn fetch_books(conn: &Connection, limit: Option<u64>) -> Result<Vec<StoredBook>, DbError> {
    let mut sql = String::from(
        "SELECT id, title, author, price, rating, availability FROM books ORDER BY id",
    );
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(StoredBook {
            id: row.get(0)?,
            record: BookRecord {
                title: row.get(1)?,
                author: row.get(2)?,
                price: row.get(3)?,
                rating: row.get(4)?,
                availability: row.get(5)?,
            },
        })
    })?;

    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, price: Option<&str>) -> BookRecord {
        BookRecord {
            title: Some(title.to_string()),
            author: Some("Joe Reis".to_string()),
            price: price.map(str::to_string),
            rating: Some("4.7 out of 5".to_string()),
            availability: None,
        }
    }

    #[test]
    fn create_table_is_idempotent() {
        let conn = open_in_memory().unwrap();
        assert!(!table_exists(&conn).unwrap());

        create_table(&conn).unwrap();
        create_table(&conn).unwrap();

        assert!(table_exists(&conn).unwrap());
        assert_eq!(count_books(&conn).unwrap(), 0);
    }

    #[test]
    fn create_table_keeps_existing_rows() {
        let conn = open_in_memory().unwrap();
        create_table(&conn).unwrap();
        insert_book(&conn, &book("A", Some("$1"))).unwrap();

        create_table(&conn).unwrap();

        assert_eq!(count_books(&conn).unwrap(), 1);
    }

    #[test]
    fn inserts_assign_increasing_surrogate_keys() {
        let conn = open_in_memory().unwrap();
        create_table(&conn).unwrap();

        let first = insert_book(&conn, &book("A", Some("$1"))).unwrap();
        let second = insert_book(&conn, &book("B", None)).unwrap();

        assert!(second > first);
    }

    #[test]
    fn stores_nulls_and_reads_back_in_order() {
        let conn = open_in_memory().unwrap();
        create_table(&conn).unwrap();
        let books = vec![book("A", Some("$1")), book("B", None), BookRecord::default()];

        let inserted = insert_books(&conn, &books).unwrap();
        let stored = fetch_books(&conn, None).unwrap();

        assert_eq!(inserted, 3);
        assert_eq!(
            stored.iter().map(|s| s.record.clone()).collect::<Vec<_>>(),
            books
        );
        assert_eq!(stored[1].record.price, None);
        assert_eq!(stored[2].record, BookRecord::default());
    }

    #[test]
    fn fetch_respects_limit() {
        let conn = open_in_memory().unwrap();
        create_table(&conn).unwrap();
        insert_books(&conn, &[book("A", None), book("B", None), book("C", None)]).unwrap();

        let stored = fetch_books(&conn, Some(2)).unwrap();

        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].record.title.as_deref(), Some("A"));
    }

    #[test]
    fn insert_without_table_fails() {
        let conn = open_in_memory().unwrap();
        assert!(insert_book(&conn, &book("A", None)).is_err());
    }

    #[test]
    fn open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("books.duckdb");

        let conn = open(&path).unwrap();
        create_table(&conn).unwrap();
        drop(conn);

        assert!(path.exists());
    }
}
