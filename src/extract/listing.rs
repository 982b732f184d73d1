//! Listing page parsing
//!
//! Pulls the ad anchors out of a catalog listing page. Identity derivation and
//! duplicate classification happen later, in the page walker.

use scraper::{Html, Selector};
use url::Url;

/// Selector whose presence marks a rendered listing page
pub const LISTING_READY_SELECTOR: &str = ".a-card__title";

/// Selector for the ad anchors on a listing page
pub const LISTING_LINK_SELECTOR: &str = ".a-card__title a";

/// One ad anchor found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingAnchor {
    /// Anchor resolved to an absolute HTTP(S) URL
    Link(Url),

    /// Anchor has no usable `href`
    MissingHref,

    /// `href` could not be resolved to an HTTP(S) URL
    Invalid(String),
}

/// Result of scanning a listing page
#[derive(Debug, Clone, Default)]
pub struct ListingScan {
    /// Anchors in document order
    pub anchors: Vec<ListingAnchor>,
}

/// Extracts the ad anchors from a listing page
///
/// Relative hrefs are resolved against `base_url`.
///
/// # Example
///
/// ```
/// use ad_harvest::extract::{extract_listing_links, ListingAnchor};
/// use url::Url;
///
/// let html = r#"<div class="a-card__title"><a href="/a/show/10">Camry</a></div>"#;
/// let base = Url::parse("https://kolesa.kz").unwrap();
/// let scan = extract_listing_links(html, &base);
/// assert_eq!(
///     scan.anchors,
///     vec![ListingAnchor::Link(Url::parse("https://kolesa.kz/a/show/10").unwrap())]
/// );
/// ```
pub fn extract_listing_links(html: &str, base_url: &Url) -> ListingScan {
    let document = Html::parse_document(html);

    let mut anchors = Vec::new();
    if let Ok(link_selector) = Selector::parse(LISTING_LINK_SELECTOR) {
        for element in document.select(&link_selector) {
            let anchor = match element.value().attr("href").map(str::trim) {
                None | Some("") => ListingAnchor::MissingHref,
                Some(href) => match resolve_link(href, base_url) {
                    Some(url) => ListingAnchor::Link(url),
                    None => ListingAnchor::Invalid(href.to_string()),
                },
            };
            anchors.push(anchor);
        }
    }

    ListingScan { anchors }
}

/// Resolves an href to an absolute HTTP(S) URL
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    if href.starts_with("javascript:") || href.starts_with("mailto:") || href.starts_with('#') {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}
