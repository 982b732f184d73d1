use crate::ad::AdId;
use chrono::{DateTime, Utc};

/// Value stored for any text field the detail page does not provide
pub const UNAVAILABLE: &str = "Недоступно";

/// Site token for "yes" in the customs-clearance row
const YES_TOKEN: &str = "Да";

/// Site token for "no" in the customs-clearance row
const NO_TOKEN: &str = "Нет";

/// Whether the vehicle has cleared customs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomsCleared {
    Yes,
    No,
    /// Row missing or holding an unrecognized token
    Unknown,
}

impl CustomsCleared {
    /// Parses the site's yes/no token
    ///
    /// Anything other than the exact tokens yields `Unknown`, never `No`.
    pub fn from_token(text: &str) -> Self {
        match text.trim() {
            YES_TOKEN => Self::Yes,
            NO_TOKEN => Self::No,
            _ => Self::Unknown,
        }
    }

    /// Converts to the nullable boolean stored in the database
    pub fn to_db_value(self) -> Option<bool> {
        match self {
            Self::Yes => Some(true),
            Self::No => Some(false),
            Self::Unknown => None,
        }
    }

    /// Converts from the nullable boolean stored in the database
    pub fn from_db_value(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Yes,
            Some(false) => Self::No,
            None => Self::Unknown,
        }
    }
}

/// Fields extracted from an ad's detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdDetails {
    pub title: String,
    pub year: String,
    pub price: String,
    pub city: String,
    /// Seller's free text with markup stripped
    pub comment: String,
    pub generation: String,
    pub body_type: String,
    pub engine_volume: String,
    pub transmission: String,
    pub drive_type: String,
    pub wheel_side: String,
    pub color: String,
    pub customs_cleared: CustomsCleared,
}

impl Default for AdDetails {
    fn default() -> Self {
        let na = || UNAVAILABLE.to_string();
        Self {
            title: na(),
            year: na(),
            price: na(),
            city: na(),
            comment: na(),
            generation: na(),
            body_type: na(),
            engine_volume: na(),
            transmission: na(),
            drive_type: na(),
            wheel_side: na(),
            color: na(),
            customs_cleared: CustomsCleared::Unknown,
        }
    }
}

/// One ingested catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct AdRecord {
    /// Identity derived from `url`
    pub id: AdId,

    /// Canonical absolute URL of the detail page
    pub url: String,

    pub details: AdDetails,

    /// When the detail page was extracted
    pub ingested_at: DateTime<Utc>,
}
