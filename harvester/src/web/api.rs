//! REST API handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use harvest_common::{bad_request, not_found, ApiResult, ResultExt};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use crate::archive;
use crate::models::{CrawlJob, ImageFilter, SortOrder, StoredImage};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Start crawl request
#[derive(Debug, Deserialize)]
pub struct CrawlRequest {
    #[serde(default)]
    pub keyword: String,
    pub limit: Option<u32>,
}

/// Start crawl response
#[derive(Debug, Serialize, Deserialize)]
pub struct CrawlResponse {
    pub message: String,
    pub job_id: String,
}

/// Create a crawl job and run it in the background
pub async fn start_crawl(
    State(state): State<AppState>,
    Json(req): Json<CrawlRequest>,
) -> ApiResult<Json<CrawlResponse>> {
    let keyword = req.keyword.trim();
    if keyword.is_empty() {
        return Err(bad_request("keyword must not be empty"));
    }

    let limit = req.limit.unwrap_or(state.default_limit);
    if limit == 0 {
        return Err(bad_request("limit must be at least 1"));
    }

    let job_id = state.jobs.submit(keyword, limit)?;

    Ok(Json(CrawlResponse {
        message: "Image search job initiated".to_string(),
        job_id,
    }))
}

/// List all crawl jobs, newest first
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<CrawlJob>>> {
    let jobs = state.jobs.list().to_api_err()?;
    Ok(Json(jobs))
}

/// Get one crawl job
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CrawlJob>> {
    match state.jobs.get(&id)? {
        Some(job) => Ok(Json(job)),
        None => Err(not_found(format!("Job {} not found", id))),
    }
}

/// Image query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ImageQuery {
    pub keyword: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
    pub limit: Option<u32>,
}

impl ImageQuery {
    fn filter(self) -> ImageFilter {
        ImageFilter {
            order: self.order,
            limit: self.limit,
            ..ImageFilter::keyword(self.keyword)
        }
    }
}

/// Image list response
#[derive(Debug, Serialize, Deserialize)]
pub struct ImagesResponse {
    pub images: Vec<StoredImage>,
    pub total: usize,
}

/// List stored images matching the query
pub async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> ApiResult<Json<ImagesResponse>> {
    let images = state.store.select_images(&query.filter()).to_api_err()?;
    let total = images.len();
    Ok(Json(ImagesResponse { images, total }))
}

/// Download matching images as a zip archive
pub async fn download_images(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> ApiResult<impl IntoResponse> {
    let images = state.store.select_images(&query.filter()).to_api_err()?;
    if images.is_empty() {
        return Err(not_found("No images found"));
    }

    let summary = archive::build_archive(&state.http, &images).await?;
    tracing::info!(
        included = summary.included,
        skipped = summary.skipped,
        "Serving image archive"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=filtered_images.zip",
            ),
        ],
        summary.bytes,
    ))
}

/// Store statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub image_count: u64,
    pub job_count: u64,
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    Ok(Json(StatsResponse {
        image_count: state.store.count_images().to_api_err()?,
        job_count: state.store.count_jobs().to_api_err()?,
    }))
}
