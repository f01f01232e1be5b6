//! Crawl job and stored image types

use chrono::{DateTime, Utc};
use image_sources::ImageRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Job status
// ============================================================================

/// Crawl job status
///
/// Jobs move `pending -> running -> (completed | failed)` and never back.
/// A pending job may also fail directly when the run cannot start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Pending, JobStatus::Failed)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }

    /// Statuses a job may be in right before entering `self`
    pub fn predecessors(&self) -> &'static [JobStatus] {
        match self {
            JobStatus::Pending => &[],
            JobStatus::Running => &[JobStatus::Pending],
            JobStatus::Completed => &[JobStatus::Running],
            JobStatus::Failed => &[JobStatus::Pending, JobStatus::Running],
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(anyhow::anyhow!("Unknown job status: {}", s)),
        }
    }
}

/// Rejected status change
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("crawl job '{0}' not found")]
    NotFound(String),

    #[error("crawl job '{id}' cannot move from {from} to {to}")]
    Illegal {
        id: String,
        from: JobStatus,
        to: JobStatus,
    },
}

// ============================================================================
// Crawl job
// ============================================================================

/// One aggregation request's lifecycle record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlJob {
    pub id: String,
    pub status: JobStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// The search keyword
    #[serde(rename = "target_url")]
    pub target: String,
    pub requested_limit: u32,
    /// Number of image records persisted for this job
    pub image_count: u32,
    #[serde(default)]
    pub errors: Vec<String>,
    /// Reserved for an external crawler process
    pub process_handle: Option<String>,
}

impl CrawlJob {
    /// A fresh job in `pending` state
    pub fn pending(keyword: &str, limit: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            status: JobStatus::Pending,
            start_time: Utc::now(),
            end_time: None,
            target: keyword.to_string(),
            requested_limit: limit,
            image_count: 0,
            errors: Vec::new(),
            process_handle: None,
        }
    }
}

/// A status change plus the fields written with it
#[derive(Debug, Clone, PartialEq)]
pub struct JobTransition {
    pub status: JobStatus,
    pub end_time: Option<DateTime<Utc>>,
    pub image_count: Option<u32>,
    pub errors: Option<Vec<String>>,
}

impl JobTransition {
    pub fn running() -> Self {
        Self {
            status: JobStatus::Running,
            end_time: None,
            image_count: None,
            errors: None,
        }
    }

    /// Terminal transition with the final count and error list
    pub fn finish(status: JobStatus, image_count: u32, errors: Vec<String>) -> Self {
        Self {
            status,
            end_time: Some(Utc::now()),
            image_count: Some(image_count),
            errors: Some(errors),
        }
    }

    /// Force-fail with a single error message
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            end_time: Some(Utc::now()),
            image_count: None,
            errors: Some(vec![message.into()]),
        }
    }
}

// ============================================================================
// Stored images
// ============================================================================

/// An image record as persisted, with its store-assigned id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredImage {
    pub id: i64,
    #[serde(flatten)]
    pub record: ImageRecord,
}

/// Sort direction on crawl date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Image query filter
///
/// `keyword` matches a case-insensitive substring of the alt text or job
/// keyword, or an exact tag.
#[derive(Debug, Clone, Default)]
pub struct ImageFilter {
    pub keyword: Option<String>,
    pub order: SortOrder,
    pub limit: Option<u32>,
}

impl ImageFilter {
    pub fn keyword(keyword: Option<String>) -> Self {
        Self {
            keyword: keyword.filter(|k| !k.trim().is_empty()),
            ..Default::default()
        }
    }
}
