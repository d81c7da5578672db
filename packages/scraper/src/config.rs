//! Site configuration: where to scrape, which headers to send, and which
//! CSS selectors locate the links and fields.
//!
//! Every field has a default matching the Amazon book search the job was
//! written for, so a TOML `[site]` table only needs to list overrides.

use std::collections::BTreeMap;

use book_etl_book_models::BookField;
use serde::Deserialize;

/// Spoofed desktop browser user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/107.0.0.0 Safari/537.36";

/// Everything needed to scrape one search results page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Search results page to start from.
    pub search_url: String,
    /// Base URL that relative detail-page links are resolved against.
    pub site_root: String,
    /// CSS selector for product links on the search results page.
    pub link_selector: String,
    /// Static headers sent with every request.
    pub headers: BTreeMap<String, String>,
    /// Per-request timeout in seconds. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    /// Selectors for the five detail-page fields.
    pub selectors: FieldSelectors,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let headers = [
            ("Referer", "https://www.amazon.com/"),
            ("Sec-Ch-Ua", "Not_A Brand"),
            ("Sec-Ch-Ua-Mobile", "?0"),
            ("Sec-Ch-Ua-Platform", "macOS"),
            ("User-Agent", DEFAULT_USER_AGENT),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();

        Self {
            search_url: "https://www.amazon.com/s?k=data+engineering+books".to_owned(),
            site_root: "https://www.amazon.com".to_owned(),
            link_selector: r#"a[class="a-link-normal s-no-outline"]"#.to_owned(),
            headers,
            timeout_secs: None,
            selectors: FieldSelectors::default(),
        }
    }
}

/// CSS selectors for the five detail-page fields.
///
/// Class selectors use the exact `[class="..."]` form so an element only
/// matches when its class attribute is exactly the listed value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FieldSelectors {
    pub title: String,
    pub author: String,
    pub rating: String,
    pub price: String,
    pub availability: String,
}

impl FieldSelectors {
    /// Returns the selector configured for `field`.
    #[must_use]
    pub fn get(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Rating => &self.rating,
            BookField::Price => &self.price,
            BookField::Availability => &self.availability,
        }
    }
}

impl Default for FieldSelectors {
    fn default() -> Self {
        Self {
            title: "span#productTitle".to_owned(),
            author: r#"span[class="author notFaded"]"#.to_owned(),
            rating: r#"span[data-hook="rating-out-of-text"]"#.to_owned(),
            price: r#"span[class="a-size-base a-color-base"]"#.to_owned(),
            availability: r#"span[class="a-size-medium a-color-success"]"#.to_owned(),
        }
    }
}
