//! Storage module for persisting ingested ads
//!
//! This module handles all database operations for the harvester:
//! - SQLite database initialization and schema management
//! - Bulk read of known ad IDs at session start
//! - Batched, idempotent insertion of ad records

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{AdStore, StorageError, StorageResult};

use std::path::Path;

/// Opens the ad database at `path`
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}
