//! Crawl job persistence

use super::{format_time, parse_time, SqliteStore};
use anyhow::{Context, Result};
use rusqlite::{params, types::Type, OptionalExtension, Row};

use crate::models::{CrawlJob, JobStatus, JobTransition, TransitionError};

const JOB_COLUMNS: &str = "id, status, start_time, end_time, target_url, requested_limit, \
                           image_count, errors, pid";

fn row_to_job(row: &Row<'_>) -> rusqlite::Result<CrawlJob> {
    let status_str: String = row.get(1)?;
    let status = status_str
        .parse::<JobStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, e.into()))?;

    let start_time: String = row.get(2)?;
    let end_time: Option<String> = row.get(3)?;
    let errors: Option<String> = row.get(7)?;
    let errors = match errors {
        Some(text) => serde_json::from_str(&text)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?,
        None => Vec::new(),
    };

    Ok(CrawlJob {
        id: row.get(0)?,
        status,
        start_time: parse_time(&start_time)?,
        end_time: end_time.as_deref().map(parse_time).transpose()?,
        target: row.get(4)?,
        requested_limit: row.get(5)?,
        image_count: row.get(6)?,
        errors,
        process_handle: row.get(8)?,
    })
}

fn errors_json(errors: &[String]) -> Result<Option<String>> {
    if errors.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(errors)?))
}

impl SqliteStore {
    /// Insert a new crawl job
    pub fn insert_job(&self, job: &CrawlJob) -> Result<()> {
        let errors = errors_json(&job.errors)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO crawl_jobs (
                id, status, start_time, end_time, target_url, requested_limit,
                image_count, errors, pid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                &job.id,
                job.status.as_str(),
                format_time(&job.start_time),
                job.end_time.as_ref().map(format_time),
                &job.target,
                job.requested_limit,
                job.image_count,
                errors,
                &job.process_handle,
            ],
        )
        .context("Failed to create crawl job")?;

        Ok(())
    }

    /// Move a job to a new status, only from an allowed predecessor
    pub fn transition_job(&self, id: &str, transition: &JobTransition) -> Result<()> {
        let to = transition.status;
        let allowed = to
            .predecessors()
            .iter()
            .map(|s| format!("'{}'", s.as_str()))
            .collect::<Vec<_>>()
            .join(", ");

        let errors = match &transition.errors {
            Some(errors) => errors_json(errors)?,
            None => None,
        };

        let conn = self.conn()?;

        let changed = if allowed.is_empty() {
            0
        } else {
            let sql = format!(
                r#"
                UPDATE crawl_jobs SET
                    status = ?1,
                    end_time = COALESCE(?2, end_time),
                    image_count = COALESCE(?3, image_count),
                    errors = CASE WHEN ?4 THEN ?5 ELSE errors END,
                    pid = CASE WHEN ?6 THEN NULL ELSE pid END
                WHERE id = ?7 AND status IN ({})
                "#,
                allowed
            );

            conn.execute(
                &sql,
                params![
                    to.as_str(),
                    transition.end_time.as_ref().map(format_time),
                    transition.image_count,
                    transition.errors.is_some(),
                    errors,
                    to.is_terminal(),
                    id,
                ],
            )
            .context("Failed to update crawl job status")?
        };

        if changed == 0 {
            let current: Option<String> = conn
                .query_row(
                    "SELECT status FROM crawl_jobs WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()
                .context("Failed to query crawl job")?;

            let err = match current {
                None => TransitionError::NotFound(id.to_string()),
                Some(status) => TransitionError::Illegal {
                    id: id.to_string(),
                    from: status.parse()?,
                    to,
                },
            };
            return Err(err.into());
        }

        Ok(())
    }

    /// Get a job by ID
    pub fn get_job(&self, id: &str) -> Result<Option<CrawlJob>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM crawl_jobs WHERE id = ?1", JOB_COLUMNS);

        conn.query_row(&sql, params![id], row_to_job)
            .optional()
            .context("Failed to query crawl job")
    }

    /// List all jobs, newest first
    pub fn list_jobs(&self) -> Result<Vec<CrawlJob>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM crawl_jobs ORDER BY start_time DESC, rowid DESC",
            JOB_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let jobs = stmt
            .query_map([], row_to_job)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list crawl jobs")?;

        Ok(jobs)
    }

    pub fn count_jobs(&self) -> Result<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM crawl_jobs", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
