//! Product detail page: five-field extraction.
//!
//! Every field is extracted independently. A field whose element is missing
//! becomes an empty string and a warning is logged; the other fields and the
//! record itself are unaffected.

use book_etl_book_models::{BookField, BookRecord};
use scraper::{Html, Selector};

use crate::config::FieldSelectors;
use crate::{ScrapeError, parse_selector};

/// Field selectors compiled once per scraper.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    title: Selector,
    author: Selector,
    rating: Selector,
    price: Selector,
    availability: Selector,
}

impl CompiledSelectors {
    /// Compiles every selector in `selectors`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Selector`] for the first invalid selector.
    pub fn compile(selectors: &FieldSelectors) -> Result<Self, ScrapeError> {
        Ok(Self {
            title: parse_selector(&selectors.title)?,
            author: parse_selector(&selectors.author)?,
            rating: parse_selector(&selectors.rating)?,
            price: parse_selector(&selectors.price)?,
            availability: parse_selector(&selectors.availability)?,
        })
    }

    /// Returns the compiled selector for `field`.
    #[must_use]
    pub const fn get(&self, field: BookField) -> &Selector {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Rating => &self.rating,
            BookField::Price => &self.price,
            BookField::Availability => &self.availability,
        }
    }
}

/// Returns the trimmed text of the first element matching `selector`, or an
/// empty string (with a logged warning) when there is none.
#[must_use]
pub fn extract_field(document: &Html, field: BookField, selector: &Selector) -> String {
    document.select(selector).next().map_or_else(
        || {
            log::warn!("Failed to get the {field}");
            String::new()
        },
        |el| el.text().collect::<String>().trim().to_owned(),
    )
}

/// Parses one detail page into a record. Every field is `Some`, possibly
/// empty.
#[must_use]
pub fn parse_detail(html: &str, selectors: &CompiledSelectors) -> BookRecord {
    let document = Html::parse_document(html);
    let mut record = BookRecord::default();

    for field in BookField::ALL {
        let value = extract_field(&document, field, selectors.get(field));
        record.set_field(field, Some(value));
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PAGE: &str = r#"
        <html><body>
          <span id="productTitle">
            Fundamentals of Data Engineering
          </span>
          <span class="author notFaded">
            <a href="/joe">Joe Reis</a>
            <span>(Author),</span>
          </span>
          <span data-hook="rating-out-of-text">4.7 out of 5</span>
          <span class="a-size-base a-color-base">$41.99</span>
          <span class="a-size-medium a-color-success"> In Stock </span>
        </body></html>
    "#;

    fn selectors() -> CompiledSelectors {
        CompiledSelectors::compile(&FieldSelectors::default()).unwrap()
    }

    fn page_without(field: BookField) -> String {
        let marker = match field {
            BookField::Title => r#"id="productTitle""#,
            BookField::Author => r#"class="author notFaded""#,
            BookField::Rating => r#"data-hook="rating-out-of-text""#,
            BookField::Price => r#"class="a-size-base a-color-base""#,
            BookField::Availability => r#"class="a-size-medium a-color-success""#,
        };
        FULL_PAGE.replace(marker, r#"class="unrelated""#)
    }

    #[test]
    fn extracts_all_fields_from_full_page() {
        let record = parse_detail(FULL_PAGE, &selectors());

        assert_eq!(
            record.title.as_deref(),
            Some("Fundamentals of Data Engineering")
        );
        assert!(record.author.as_deref().unwrap().starts_with("Joe Reis"));
        assert!(record.author.as_deref().unwrap().ends_with("(Author),"));
        assert_eq!(record.rating.as_deref(), Some("4.7 out of 5"));
        assert_eq!(record.price.as_deref(), Some("$41.99"));
        assert_eq!(record.availability.as_deref(), Some("In Stock"));
    }

    #[test]
    fn missing_element_only_empties_its_own_field() {
        let full = parse_detail(FULL_PAGE, &selectors());

        for missing in BookField::ALL {
            let record = parse_detail(&page_without(missing), &selectors());

            for field in BookField::ALL {
                if field == missing {
                    assert_eq!(record.field(field), Some(""), "{field} should be empty");
                } else {
                    assert_eq!(
                        record.field(field),
                        full.field(field),
                        "{field} changed when {missing} was missing"
                    );
                }
            }
        }
    }

    #[test]
    fn empty_page_yields_all_empty_fields() {
        let record = parse_detail("<html><body></body></html>", &selectors());

        for field in BookField::ALL {
            assert_eq!(record.field(field), Some(""));
        }
    }

    #[test]
    fn takes_first_match_only() {
        let html = r#"
            <span class="a-size-base a-color-base">$10.00</span>
            <span class="a-size-base a-color-base">$99.00</span>
        "#;
        let document = Html::parse_document(html);
        let sel = selectors();

        assert_eq!(
            extract_field(&document, BookField::Price, sel.get(BookField::Price)),
            "$10.00"
        );
    }
}
