//! SQLite-backed storage
//!
//! Stores crawl jobs and image metadata in ~/.image-harvester/harvester.db

pub mod images;
pub mod jobs;
pub mod schema;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use image_sources::ImageRecord;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{CrawlJob, ImageFilter, JobTransition, StoredImage};
use crate::storage::Storage;

/// Database connection wrapper with thread-safe access
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at the default location
    pub fn open() -> Result<Self> {
        let path = Self::default_path()?;
        Self::open_at(path)
    }

    /// Open or create the database at a specific path
    pub fn open_at(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {:?}", path))?;

        let store = Self::from_connection(conn)?;
        tracing::info!("Database opened at {:?}", path);
        Ok(store)
    }

    /// Private in-memory database (tests, dry runs)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        schema::create_tables(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the default database path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".image-harvester").join("harvester.db"))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Database connection lock poisoned"))
    }
}

/// Fixed-width UTC timestamps so text ordering matches time ordering
pub(crate) fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_time(text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

impl Storage for SqliteStore {
    fn insert_job(&self, job: &CrawlJob) -> Result<()> {
        SqliteStore::insert_job(self, job)
    }

    fn transition_job(&self, id: &str, transition: &JobTransition) -> Result<()> {
        SqliteStore::transition_job(self, id, transition)
    }

    fn get_job(&self, id: &str) -> Result<Option<CrawlJob>> {
        SqliteStore::get_job(self, id)
    }

    fn list_jobs(&self) -> Result<Vec<CrawlJob>> {
        SqliteStore::list_jobs(self)
    }

    fn insert_image(&self, image: &ImageRecord) -> Result<i64> {
        SqliteStore::insert_image(self, image)
    }

    fn select_images(&self, filter: &ImageFilter) -> Result<Vec<StoredImage>> {
        SqliteStore::select_images(self, filter)
    }

    fn count_images(&self) -> Result<u64> {
        SqliteStore::count_images(self)
    }

    fn count_jobs(&self) -> Result<u64> {
        SqliteStore::count_jobs(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_database_open_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("test.db");
        let store = SqliteStore::open_at(path.clone()).unwrap();
        assert!(path.exists());
        drop(store);
    }

    #[test]
    fn test_time_format_is_fixed_width() {
        let a = DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let b = DateTime::parse_from_rfc3339("2026-01-02T03:04:05.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_time(&a).len(), format_time(&b).len());
        assert_eq!(parse_time(&format_time(&b)).unwrap(), b);
    }
}
