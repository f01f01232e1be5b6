//! Image harvester
//!
//! Queries stock-photo APIs for a keyword, stores the normalized image
//! metadata in SQLite and tracks every request as a crawl job.

pub mod aggregator;
pub mod archive;
pub mod config;
pub mod db;
pub mod jobs;
pub mod models;
pub mod storage;
pub mod web;

pub use aggregator::{Aggregator, Collection};
pub use config::Config;
pub use db::SqliteStore;
pub use jobs::{JobManager, JobOutcome};
pub use models::{CrawlJob, ImageFilter, JobStatus, SortOrder, StoredImage};
pub use storage::Storage;
