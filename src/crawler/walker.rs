//! Listing page walker
//!
//! Turns one catalog listing page into the ordered list of ads that still need
//! fetching, registering each new ID as known before it is fetched.

use crate::ad::{extract_ad_id, AdId};
use crate::crawler::DuplicateStore;
use crate::extract::{extract_listing_links, ListingAnchor};
use url::Url;

/// An ad link that is not yet known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: AdId,
    pub url: Url,
}

/// Outcome of walking one listing page
#[derive(Debug, Clone, Default)]
pub struct WalkReport {
    /// New ads, in page order
    pub candidates: Vec<Candidate>,

    /// Links whose ID was already known
    pub known: usize,

    /// All ad anchors on the page, including unusable ones
    pub total: usize,
}

impl WalkReport {
    /// True when nothing on the page was new (including an empty page)
    pub fn all_known(&self) -> bool {
        self.known == self.total
    }
}

/// Addresses listing pages and classifies their links
#[derive(Debug, Clone)]
pub struct PageWalker {
    base_url: Url,
    listing_url: Url,
}

impl PageWalker {
    pub fn new(base_url: &str, listing_path: &str) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(base_url)?;
        let listing_url = base_url.join(listing_path)?;
        Ok(Self {
            base_url,
            listing_url,
        })
    }

    /// URL of listing page `page`, e.g. `{base}/cars/?page=3`
    pub fn listing_url(&self, page: u32) -> Url {
        let mut url = self.listing_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("page", &page.to_string());
        url
    }

    /// Classifies every ad anchor on a rendered listing page
    ///
    /// New IDs are registered in `known` immediately, so a repeated link later
    /// on the same page, or on a later page, counts as known.
    pub fn walk(&self, page: u32, html: &str, known: &mut DuplicateStore) -> WalkReport {
        let scan = extract_listing_links(html, &self.base_url);

        let mut report = WalkReport {
            total: scan.anchors.len(),
            ..WalkReport::default()
        };

        for anchor in scan.anchors {
            let url = match anchor {
                ListingAnchor::Link(url) => url,
                ListingAnchor::MissingHref => {
                    tracing::error!("Failed to retrieve href attribute on page {}", page);
                    continue;
                }
                ListingAnchor::Invalid(href) => {
                    tracing::error!("Failed to resolve ad link '{}' on page {}", href, page);
                    continue;
                }
            };

            let Some(id) = extract_ad_id(&url) else {
                tracing::error!("Failed to extract ID from URL: {}", url);
                continue;
            };

            if known.reserve(&id) {
                report.candidates.push(Candidate { id, url });
            } else {
                tracing::debug!("URL already exists in database: {}", url);
                report.known += 1;
            }
        }

        report
    }
}
