//! Ad identity and record types
//!
//! An ad's identity is derived from the digits in its URL path, so the same
//! listing reached through different links always maps to the same [`AdId`].

mod record;

pub use record::{AdDetails, AdRecord, CustomsCleared, UNAVAILABLE};

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use url::Url;

static AD_ID_PATTERN: OnceLock<Regex> = OnceLock::new();

fn ad_id_pattern() -> &'static Regex {
    AD_ID_PATTERN.get_or_init(|| Regex::new(r"/(\d+)").expect("ad id pattern is valid"))
}

/// Identifier of a single ad, as found in its URL path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdId(String);

impl AdId {
    /// Wraps an identifier that is already known to be valid (e.g. read back from storage)
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the ad identifier from a detail page URL
///
/// The identifier is the first run of digits that directly follows a `/`
/// in the URL path. Host, port, query and fragment never contribute.
///
/// # Examples
///
/// ```
/// use ad_harvest::extract_ad_id;
/// use url::Url;
///
/// let url = Url::parse("https://kolesa.kz/a/show/171234567").unwrap();
/// assert_eq!(extract_ad_id(&url).unwrap().as_str(), "171234567");
///
/// let url = Url::parse("https://kolesa.kz/cars/toyota/").unwrap();
/// assert!(extract_ad_id(&url).is_none());
/// ```
pub fn extract_ad_id(url: &Url) -> Option<AdId> {
    ad_id_pattern()
        .captures(url.path())
        .and_then(|caps| caps.get(1))
        .map(|m| AdId(m.as_str().to_string()))
}
