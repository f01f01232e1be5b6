//! Crawl job lifecycle
//!
//! A job is created `pending`, moved to `running` by its own task, and ends
//! `completed` when at least one record was collected, `failed` otherwise.

use anyhow::Result;
use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::models::{CrawlJob, JobStatus, JobTransition};
use crate::storage::Storage;

/// Result of one finished run
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub status: JobStatus,
    pub image_count: u32,
    pub errors: Vec<String>,
}

/// Creates crawl jobs and drives them to a terminal status
#[derive(Clone)]
pub struct JobManager {
    store: Arc<dyn Storage>,
    aggregator: Arc<Aggregator>,
}

impl JobManager {
    pub fn new(store: Arc<dyn Storage>, aggregator: Arc<Aggregator>) -> Self {
        Self { store, aggregator }
    }

    /// Persist a new pending job and return its id
    pub fn create(&self, keyword: &str, limit: u32) -> Result<String> {
        let job = CrawlJob::pending(keyword, limit);
        self.store.insert_job(&job)?;
        tracing::info!(job_id = %job.id, keyword, limit, "Created crawl job");
        Ok(job.id)
    }

    /// Run a created job to completion
    ///
    /// Any storage failure on the job row itself is fatal: the job is forced
    /// to `failed` (best effort) and the error is returned.
    pub async fn run(&self, job_id: &str, keyword: &str, limit: u32) -> Result<JobOutcome> {
        match self.execute(job_id, keyword, limit).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::error!(job_id, error = %e, "Crawl job failed");
                if let Err(mark_err) = self
                    .store
                    .transition_job(job_id, &JobTransition::fail(e.to_string()))
                {
                    tracing::warn!(job_id, error = %mark_err, "Could not mark job as failed");
                }
                Err(e)
            }
        }
    }

    async fn execute(&self, job_id: &str, keyword: &str, limit: u32) -> Result<JobOutcome> {
        self.store.transition_job(job_id, &JobTransition::running())?;

        let collection = self.aggregator.collect(keyword, limit as usize).await;
        let mut errors = collection.errors;

        let status = if collection.images.is_empty() {
            JobStatus::Failed
        } else {
            JobStatus::Completed
        };

        let mut persisted: u32 = 0;
        for image in &collection.images {
            match self.store.insert_image(image) {
                Ok(_) => persisted += 1,
                Err(e) => {
                    tracing::warn!(job_id, url = %image.url, error = %e, "Failed to store image");
                    errors.push(format!("Failed to store image {}: {}", image.url, e));
                }
            }
        }

        self.store.transition_job(
            job_id,
            &JobTransition::finish(status, persisted, errors.clone()),
        )?;

        tracing::info!(job_id, %status, image_count = persisted, "Crawl job finished");

        Ok(JobOutcome {
            status,
            image_count: persisted,
            errors,
        })
    }

    /// Create a job and run it on a background task
    pub fn submit(&self, keyword: &str, limit: u32) -> Result<String> {
        let job_id = self.create(keyword, limit)?;

        let manager = self.clone();
        let id = job_id.clone();
        let keyword = keyword.to_string();
        tokio::spawn(async move {
            // errors are logged and recorded on the job row by `run`
            let _ = manager.run(&id, &keyword, limit).await;
        });

        Ok(job_id)
    }

    /// All jobs, newest first
    pub fn list(&self) -> Result<Vec<CrawlJob>> {
        self.store.list_jobs()
    }

    pub fn get(&self, job_id: &str) -> Result<Option<CrawlJob>> {
        self.store.get_job(job_id)
    }
}
