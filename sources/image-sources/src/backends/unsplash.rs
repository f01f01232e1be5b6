//! Unsplash backend
//!
//! See: https://unsplash.com/documentation#search-photos

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header::AUTHORIZATION, Client};
use serde::Deserialize;

use super::{endpoint, fetch_json, page_size, ImageBackend};
use crate::config::ApiKeyConfig;
use crate::error::SourceResult;
use crate::types::{ImageRecord, ImageSource};

const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";

/// Unsplash backend
pub struct UnsplashBackend {
    client: Client,
    config: ApiKeyConfig,
}

impl UnsplashBackend {
    pub fn new(client: Client, config: ApiKeyConfig) -> Self {
        Self { client, config }
    }
}

#[derive(Debug, Deserialize)]
struct UnsplashResponse {
    #[serde(default)]
    results: Vec<UnsplashPhoto>,
}

#[derive(Debug, Deserialize)]
struct UnsplashPhoto {
    width: Option<u32>,
    height: Option<u32>,
    description: Option<String>,
    alt_description: Option<String>,
    #[serde(default)]
    urls: UnsplashUrls,
    #[serde(default)]
    links: UnsplashLinks,
    #[serde(default)]
    tags: Vec<UnsplashTag>,
}

#[derive(Debug, Default, Deserialize)]
struct UnsplashUrls {
    regular: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UnsplashLinks {
    html: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UnsplashTag {
    title: Option<String>,
}

fn to_record(photo: UnsplashPhoto, query: &str) -> ImageRecord {
    let alt_text = photo
        .alt_description
        .filter(|s| !s.is_empty())
        .or(photo.description)
        .unwrap_or_default();

    ImageRecord {
        url: photo.urls.regular.unwrap_or_default(),
        source: ImageSource::Unsplash,
        source_url: photo.links.html,
        alt_text,
        width: photo.width,
        height: photo.height,
        size: None,
        format: "jpg".to_string(),
        tags: photo.tags.into_iter().filter_map(|t| t.title).collect(),
        keyword: query.to_string(),
        crawl_date: Utc::now(),
    }
}

#[async_trait]
impl ImageBackend for UnsplashBackend {
    fn source(&self) -> ImageSource {
        ImageSource::Unsplash
    }

    fn is_available(&self) -> bool {
        self.config.key().is_some()
    }

    async fn search(&self, query: &str, count: usize) -> SourceResult<Vec<ImageRecord>> {
        let Some(key) = self.config.key() else {
            tracing::debug!("Unsplash access key not found");
            return Ok(Vec::new());
        };

        let url = endpoint(self.config.base_url.as_deref(), DEFAULT_BASE_URL, "/search/photos");
        let per_page = page_size(self.source(), count).to_string();

        tracing::debug!("Searching Unsplash for '{}' (per_page: {})", query, per_page);

        let request = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Client-ID {}", key))
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("orientation", "landscape"),
            ]);

        let response: UnsplashResponse = fetch_json(request).await?;

        Ok(response
            .results
            .into_iter()
            .map(|photo| to_record(photo, query))
            .collect())
    }
}
