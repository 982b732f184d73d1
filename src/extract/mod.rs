//! HTML extraction for catalog pages
//!
//! This module turns rendered markup into structured data:
//! - Listing pages into the ordered list of ad anchors
//! - Detail pages into [`AdDetails`](crate::ad::AdDetails)

mod detail;
mod listing;

pub use detail::{extract_details, DETAIL_READY_SELECTOR};
pub use listing::{
    extract_listing_links, ListingAnchor, ListingScan, LISTING_LINK_SELECTOR,
    LISTING_READY_SELECTOR,
};
