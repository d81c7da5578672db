#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cleaning rules applied to a scraped [`BookBatch`].
//!
//! The steps always run in this order:
//!
//! 1. [`nullify_blanks`] turns empty strings into nulls.
//! 2. [`drop_duplicates`] removes rows identical across all five fields,
//!    keeping the first occurrence.
//! 3. [`strip_author_suffix`] removes the `(Author)` marker from the author.
//! 4. [`filter_price`] nulls any price that does not start with the
//!    currency symbol.
//! 5. [`drop_duplicates`] runs once more, since steps 3 and 4 can make two
//!    rows identical.
//!
//! Price and rating stay opaque strings; nothing is parsed as a number.

use std::collections::HashSet;
use std::sync::LazyLock;

use book_etl_book_models::{BookBatch, BookField, BookRecord};
use regex::Regex;
use serde::Deserialize;

/// Currency symbol a valid price must start with.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// `(Author)` marker, optionally preceded by a line break and optionally
/// followed by a comma.
static AUTHOR_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?\(Author\),?").unwrap_or_else(|_| unreachable!()));

/// Cleaning options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// Prefix a price must carry to be kept.
    pub currency_symbol: String,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_owned(),
        }
    }
}

/// Applies every cleaning step to a batch.
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    config: CleanConfig,
}

impl Cleaner {
    /// Creates a cleaner with the given options.
    #[must_use]
    pub const fn new(config: CleanConfig) -> Self {
        Self { config }
    }

    /// Runs every step in order and returns the cleaned batch.
    #[must_use]
    pub fn clean(&self, mut batch: BookBatch) -> BookBatch {
        let before = batch.len();

        nullify_blanks(&mut batch);
        let mut removed = drop_duplicates(&mut batch);

        for author in batch.column_mut(BookField::Author) {
            if let Some(value) = author.take() {
                *author = non_empty(strip_author_suffix(&value));
            }
        }

        let symbol = &self.config.currency_symbol;
        for price in batch.column_mut(BookField::Price) {
            if let Some(value) = price.take() {
                *price = filter_price(value, symbol);
            }
        }

        removed += drop_duplicates(&mut batch);

        log::info!(
            "Cleaned batch: {before} -> {} rows ({removed} duplicates removed)",
            batch.len()
        );

        batch
    }
}

/// Replaces every empty-string value in the batch with null.
pub fn nullify_blanks(batch: &mut BookBatch) {
    for field in BookField::ALL {
        for value in batch.column_mut(field) {
            if value.as_deref() == Some("") {
                *value = None;
            }
        }
    }
}

/// Removes rows identical across all five fields, keeping the first
/// occurrence and the relative order of everything kept.
///
/// Returns the number of rows removed.
pub fn drop_duplicates(batch: &mut BookBatch) -> usize {
    let before = batch.len();
    let mut seen: HashSet<BookRecord> = HashSet::with_capacity(before);
    batch.retain_rows(|record| seen.insert(record.clone()));
    before - batch.len()
}

/// Removes every `(Author)` marker (with its optional leading line break
/// and trailing comma) from an author string.
#[must_use]
pub fn strip_author_suffix(author: &str) -> String {
    AUTHOR_SUFFIX.replace_all(author, "").into_owned()
}

/// Keeps `price` only if it starts with `currency_symbol`.
#[must_use]
pub fn filter_price(price: String, currency_symbol: &str) -> Option<String> {
    price.starts_with(currency_symbol).then_some(price)
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
