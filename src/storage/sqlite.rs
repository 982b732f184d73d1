//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the [`AdStore`] trait.

use crate::ad::{AdDetails, AdId, AdRecord, CustomsCleared};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{AdStore, StorageResult};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;

const INSERT_AD_SQL: &str = "INSERT INTO ads (
        id, title, year, price, city, comment, generation, body_type, engine_volume,
        transmission, drive_type, wheel_side, color, customs_cleared, url, ingested_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
     ON CONFLICT(id) DO NOTHING";

const SELECT_AD_SQL: &str = "SELECT id, title, year, price, city, comment, generation, body_type,
        engine_volume, transmission, drive_type, wheel_side, color, customs_cleared, url,
        ingested_at
     FROM ads WHERE id = ?1";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and ensures the schema exists
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl AdStore for SqliteStorage {
    fn load_known_ids(&self) -> StorageResult<HashSet<AdId>> {
        let mut stmt = self.conn.prepare("SELECT id FROM ads")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|id| id.map(AdId::new))
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    fn insert_ads(&mut self, ads: &[AdRecord]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;

        {
            let mut stmt = tx.prepare(INSERT_AD_SQL)?;
            for ad in ads {
                let d = &ad.details;
                inserted += stmt.execute(params![
                    ad.id.as_str(),
                    d.title,
                    d.year,
                    d.price,
                    d.city,
                    d.comment,
                    d.generation,
                    d.body_type,
                    d.engine_volume,
                    d.transmission,
                    d.drive_type,
                    d.wheel_side,
                    d.color,
                    d.customs_cleared.to_db_value(),
                    ad.url,
                    format_timestamp(&ad.ingested_at),
                ])?;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn get_ad(&self, id: &AdId) -> StorageResult<Option<AdRecord>> {
        let ad = self
            .conn
            .query_row(SELECT_AD_SQL, params![id.as_str()], row_to_record)
            .optional()?;
        Ok(ad)
    }

    fn count_ads(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM ads", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn latest_ingested_at(&self) -> StorageResult<Option<DateTime<Utc>>> {
        let latest: Option<String> =
            self.conn
                .query_row("SELECT MAX(ingested_at) FROM ads", [], |row| row.get(0))?;

        latest
            .map(|raw| parse_timestamp(&raw, 0))
            .transpose()
            .map_err(Into::into)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<AdRecord> {
    let ingested_at: String = row.get(15)?;
    Ok(AdRecord {
        id: AdId::new(row.get::<_, String>(0)?),
        details: AdDetails {
            title: row.get(1)?,
            year: row.get(2)?,
            price: row.get(3)?,
            city: row.get(4)?,
            comment: row.get(5)?,
            generation: row.get(6)?,
            body_type: row.get(7)?,
            engine_volume: row.get(8)?,
            transmission: row.get(9)?,
            drive_type: row.get(10)?,
            wheel_side: row.get(11)?,
            color: row.get(12)?,
            customs_cleared: CustomsCleared::from_db_value(row.get(13)?),
        },
        url: row.get(14)?,
        ingested_at: parse_timestamp(&ingested_at, 15)?,
    })
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}
