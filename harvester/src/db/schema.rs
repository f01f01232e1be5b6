//! Database schema definitions

use anyhow::Result;
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Create all tables if they don't exist
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Crawl jobs table
        CREATE TABLE IF NOT EXISTS crawl_jobs (
            id TEXT PRIMARY KEY,
            status TEXT NOT NULL DEFAULT 'pending',
            start_time TEXT NOT NULL,
            end_time TEXT,
            target_url TEXT NOT NULL,
            requested_limit INTEGER NOT NULL,
            image_count INTEGER NOT NULL DEFAULT 0,
            errors TEXT,
            pid TEXT
        );

        -- Image metadata table
        CREATE TABLE IF NOT EXISTS image_metadata (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL,
            source TEXT NOT NULL,
            source_url TEXT,
            alt_text TEXT NOT NULL DEFAULT '',
            width INTEGER,
            height INTEGER,
            size INTEGER,
            format TEXT NOT NULL DEFAULT '',
            tags TEXT NOT NULL DEFAULT '[]',
            keyword TEXT NOT NULL,
            crawl_date TEXT NOT NULL
        );

        -- Index for listing jobs by start time
        CREATE INDEX IF NOT EXISTS idx_crawl_jobs_start
        ON crawl_jobs(start_time DESC);

        -- Index for keyword filtering and date ordering
        CREATE INDEX IF NOT EXISTS idx_image_metadata_keyword
        ON image_metadata(keyword, crawl_date);

        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_version(conn: &Connection) -> Result<i32> {
    let version: i32 = conn.query_row(
        "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}
