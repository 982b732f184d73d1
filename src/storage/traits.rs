//! Storage traits and error types
//!
//! This module defines the trait interface for the durable ad store and
//! associated error types.

use crate::ad::{AdId, AdRecord};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable store of ingested ads
///
/// Rows are keyed by ad ID and never overwritten once written.
pub trait AdStore {
    /// Loads every ad ID already persisted
    fn load_known_ids(&self) -> StorageResult<HashSet<AdId>>;

    /// Inserts a batch of ads in a single transaction
    ///
    /// Ads whose ID is already stored are skipped, never updated. The whole
    /// batch is rolled back if any insert fails.
    ///
    /// # Returns
    ///
    /// The number of rows actually inserted
    fn insert_ads(&mut self, ads: &[AdRecord]) -> StorageResult<usize>;

    /// Gets a single ad by ID
    fn get_ad(&self, id: &AdId) -> StorageResult<Option<AdRecord>>;

    /// Counts all stored ads
    fn count_ads(&self) -> StorageResult<u64>;

    /// Timestamp of the most recently ingested ad
    fn latest_ingested_at(&self) -> StorageResult<Option<DateTime<Utc>>>;
}
