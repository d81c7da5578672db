//! Search results page: product link discovery.

use reqwest::Url;
use scraper::{Html, Selector};

use crate::ScrapeError;

/// Parses the configured site root.
///
/// # Errors
///
/// Returns [`ScrapeError::Url`] if `site_root` is not an absolute URL.
pub fn parse_site_root(site_root: &str) -> Result<Url, ScrapeError> {
    Url::parse(site_root).map_err(|e| ScrapeError::Url {
        url: site_root.to_owned(),
        message: e.to_string(),
    })
}

/// Resolves an `href` against the site root.
///
/// Absolute URLs are returned unchanged; relative paths are joined onto
/// `site_root`. Returns `None` for empty or unresolvable links.
#[must_use]
pub fn resolve_link(site_root: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    site_root.join(href).ok().map(String::from)
}

/// Collects every product link on a search results page, in document order.
///
/// Anchors matching `link_selector` without an `href` are skipped.
/// Duplicates are kept: each occurrence becomes its own detail-page visit.
#[must_use]
pub fn parse_listing(html: &str, link_selector: &Selector, site_root: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(link_selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| {
            let resolved = resolve_link(site_root, href);
            if resolved.is_none() {
                log::warn!("Ignoring unresolvable product link '{href}'");
            }
            resolved
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::parse_selector;

    fn root() -> Url {
        parse_site_root("https://www.amazon.com").unwrap()
    }

    fn default_link_selector() -> Selector {
        parse_selector(&SiteConfig::default().link_selector).unwrap()
    }

    #[test]
    fn resolves_relative_path_against_root() {
        assert_eq!(
            resolve_link(&root(), "/Designing-Data-Intensive/dp/1449373321"),
            Some("https://www.amazon.com/Designing-Data-Intensive/dp/1449373321".to_string())
        );
    }

    #[test]
    fn keeps_absolute_links() {
        assert_eq!(
            resolve_link(&root(), "https://aax-us-east.amazon.com/x/click?id=1"),
            Some("https://aax-us-east.amazon.com/x/click?id=1".to_string())
        );
    }

    #[test]
    fn rejects_empty_href() {
        assert_eq!(resolve_link(&root(), "  "), None);
    }

    #[test]
    fn collects_only_matching_anchors_in_order() {
        let html = r#"
            <html><body>
              <a class="a-link-normal s-no-outline" href="/book-one/dp/1">One</a>
              <a class="a-link-normal" href="/not-a-product">Nav</a>
              <div><a class="a-link-normal s-no-outline" href="https://www.amazon.com/book-two/dp/2">Two</a></div>
              <a class="a-link-normal s-no-outline">No href</a>
              <a class="a-link-normal s-no-outline extra" href="/extra-class/dp/3">Extra</a>
            </body></html>
        "#;

        let links = parse_listing(html, &default_link_selector(), &root());

        assert_eq!(
            links,
            vec![
                "https://www.amazon.com/book-one/dp/1".to_string(),
                "https://www.amazon.com/book-two/dp/2".to_string(),
            ]
        );
    }

    #[test]
    fn page_without_links_yields_nothing() {
        let html = "<html><body><p>No results for your search.</p></body></html>";
        assert!(parse_listing(html, &default_link_selector(), &root()).is_empty());
    }
}
