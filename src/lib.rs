//! Ad-Harvest: an incremental classified-ad harvester
//!
//! This crate walks the paginated catalog of a classified-ads site, skips ads
//! it already knows about, extracts the new ones and stores them in SQLite.
//! It is built to run forever: failed sessions are torn down and restarted.

pub mod ad;
pub mod alert;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod logging;
pub mod render;
pub mod storage;

use thiserror::Error;

/// Main error type for Ad-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Failed to load {url} after {attempts} attempts: {source}")]
    PageLoadExhausted {
        url: String,
        attempts: u32,
        source: render::RenderError,
    },

    #[error("Failed to seed known ad IDs: {0}")]
    Seed(#[source] storage::StorageError),

    #[error("Failed to flush ad batch: {0}")]
    Flush(#[source] storage::StorageError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Failed to set up logging: {0}")]
    Logging(String),

    #[error("Alerting error: {0}")]
    Alert(#[from] alert::AlertError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Ad-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use ad::{extract_ad_id, AdDetails, AdId, AdRecord, CustomsCleared, UNAVAILABLE};
pub use config::Config;
pub use crawler::{CrawlController, DuplicateStore, Supervisor, WriteBuffer};
