//! Database schema definitions
//!
//! This module contains the SQL schema for the Ad-Harvest database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per ad; the id is derived from the ad URL
CREATE TABLE IF NOT EXISTS ads (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    year TEXT NOT NULL,
    price TEXT NOT NULL,
    city TEXT NOT NULL,
    comment TEXT NOT NULL,
    generation TEXT NOT NULL,
    body_type TEXT NOT NULL,
    engine_volume TEXT NOT NULL,
    transmission TEXT NOT NULL,
    drive_type TEXT NOT NULL,
    wheel_side TEXT NOT NULL,
    color TEXT NOT NULL,
    customs_cleared INTEGER,
    url TEXT NOT NULL,
    ingested_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ads_ingested_at ON ads(ingested_at);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
