//! Storage abstraction consumed by the job manager and HTTP API
//!
//! Each method is one atomic operation. No transaction spans a whole job.

use anyhow::Result;
use image_sources::ImageRecord;

use crate::models::{CrawlJob, ImageFilter, JobTransition, StoredImage};

/// Persistence for crawl jobs and image metadata
pub trait Storage: Send + Sync {
    /// Insert a new job row
    fn insert_job(&self, job: &CrawlJob) -> Result<()>;

    /// Apply a status transition
    ///
    /// Fails with [`crate::models::TransitionError`] when the job does not
    /// exist or its current status does not allow the move.
    fn transition_job(&self, id: &str, transition: &JobTransition) -> Result<()>;

    fn get_job(&self, id: &str) -> Result<Option<CrawlJob>>;

    /// All jobs, newest start time first
    fn list_jobs(&self) -> Result<Vec<CrawlJob>>;

    /// Insert one image record, returning its id
    fn insert_image(&self, image: &ImageRecord) -> Result<i64>;

    fn select_images(&self, filter: &ImageFilter) -> Result<Vec<StoredImage>>;

    fn count_images(&self) -> Result<u64>;

    fn count_jobs(&self) -> Result<u64>;
}
