#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Book record types shared by every stage of the book ETL job.
//!
//! The scraper produces a [`BookBatch`] (one column per [`BookField`],
//! aligned by index), the cleaner rewrites it in place, and the loader
//! consumes it as a list of [`BookRecord`] rows.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the five fields scraped from a product detail page.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BookField {
    /// Product title.
    Title,
    /// Author line, possibly carrying an `(Author)` marker until cleaned.
    Author,
    /// Rating text (e.g. `"4.5 out of 5"`). Never parsed.
    Rating,
    /// Price text (e.g. `"$39.99"`). Never parsed.
    Price,
    /// Availability text (e.g. `"In Stock"`).
    Availability,
}

impl BookField {
    /// All fields in extraction order.
    pub const ALL: [Self; 5] = [
        Self::Title,
        Self::Author,
        Self::Rating,
        Self::Price,
        Self::Availability,
    ];
}

/// A single scraped book.
///
/// Every field is nullable. Extraction failures produce `Some("")`, which
/// the cleaner later turns into `None`. The surrogate key is assigned by
/// the database on insert and is not part of this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookRecord {
    /// Product title.
    pub title: Option<String>,
    /// Author line.
    pub author: Option<String>,
    /// Price text, kept only when it starts with the currency symbol.
    pub price: Option<String>,
    /// Rating text.
    pub rating: Option<String>,
    /// Availability text.
    pub availability: Option<String>,
}

impl BookRecord {
    /// Returns the value of the given field.
    #[must_use]
    pub fn field(&self, field: BookField) -> Option<&str> {
        match field {
            BookField::Title => self.title.as_deref(),
            BookField::Author => self.author.as_deref(),
            BookField::Rating => self.rating.as_deref(),
            BookField::Price => self.price.as_deref(),
            BookField::Availability => self.availability.as_deref(),
        }
    }

    /// Sets the value of the given field.
    pub fn set_field(&mut self, field: BookField, value: Option<String>) {
        match field {
            BookField::Title => self.title = value,
            BookField::Author => self.author = value,
            BookField::Rating => self.rating = value,
            BookField::Price => self.price = value,
            BookField::Availability => self.availability = value,
        }
    }
}

/// Columnar batch of book records produced by one fetch run.
///
/// Each column holds one value per record; all columns always have the same
/// length. Records are kept in page-visit order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookBatch {
    title: Vec<Option<String>>,
    author: Vec<Option<String>>,
    rating: Vec<Option<String>>,
    price: Vec<Option<String>>,
    availability: Vec<Option<String>>,
}

impl BookBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a batch from rows, preserving their order.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = BookRecord>) -> Self {
        let mut batch = Self::new();
        for record in records {
            batch.push(record);
        }
        batch
    }

    /// Appends one record to every column.
    pub fn push(&mut self, record: BookRecord) {
        self.title.push(record.title);
        self.author.push(record.author);
        self.rating.push(record.rating);
        self.price.push(record.price);
        self.availability.push(record.availability);
    }

    /// Number of records in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.title.len()
    }

    /// Whether the batch holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
    }

    /// Reassembles the record at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<BookRecord> {
        if index >= self.len() {
            return None;
        }
        Some(BookRecord {
            title: self.title[index].clone(),
            author: self.author[index].clone(),
            price: self.price[index].clone(),
            rating: self.rating[index].clone(),
            availability: self.availability[index].clone(),
        })
    }

    /// Returns the batch as rows, in order.
    #[must_use]
    pub fn records(&self) -> Vec<BookRecord> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }

    /// Consumes the batch and returns it as rows, in order.
    #[must_use]
    pub fn into_records(self) -> Vec<BookRecord> {
        let Self {
            title,
            author,
            rating,
            price,
            availability,
        } = self;

        title
            .into_iter()
            .zip(author)
            .zip(rating)
            .zip(price)
            .zip(availability)
            .map(
                |((((title, author), rating), price), availability)| BookRecord {
                    title,
                    author,
                    price,
                    rating,
                    availability,
                },
            )
            .collect()
    }

    /// Returns one column.
    #[must_use]
    pub fn column(&self, field: BookField) -> &[Option<String>] {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Rating => &self.rating,
            BookField::Price => &self.price,
            BookField::Availability => &self.availability,
        }
    }

    /// Returns one column for in-place rewriting.
    #[must_use]
    pub fn column_mut(&mut self, field: BookField) -> &mut [Option<String>] {
        match field {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
            BookField::Rating => &mut self.rating,
            BookField::Price => &mut self.price,
            BookField::Availability => &mut self.availability,
        }
    }

    /// Keeps only the rows for which `keep` returns `true`, in order.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&BookRecord) -> bool) {
        let kept: Vec<BookRecord> = std::mem::take(self)
            .into_records()
            .into_iter()
            .filter(|record| keep(record))
            .collect();
        *self = Self::from_records(kept);
    }
}
