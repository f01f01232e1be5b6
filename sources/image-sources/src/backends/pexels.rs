//! Pexels backend
//!
//! See: https://www.pexels.com/api/documentation/#photos-search

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header::AUTHORIZATION, Client};
use serde::Deserialize;

use super::{endpoint, fetch_json, page_size, ImageBackend};
use crate::config::ApiKeyConfig;
use crate::error::SourceResult;
use crate::types::{ImageRecord, ImageSource};

const DEFAULT_BASE_URL: &str = "https://api.pexels.com";

/// Pexels backend
pub struct PexelsBackend {
    client: Client,
    config: ApiKeyConfig,
}

impl PexelsBackend {
    pub fn new(client: Client, config: ApiKeyConfig) -> Self {
        Self { client, config }
    }
}

#[derive(Debug, Deserialize)]
struct PexelsResponse {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    url: Option<String>,
    alt: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    src: PexelsSrc,
}

#[derive(Debug, Default, Deserialize)]
struct PexelsSrc {
    medium: Option<String>,
}

fn to_record(photo: PexelsPhoto, query: &str) -> ImageRecord {
    ImageRecord {
        url: photo.src.medium.unwrap_or_default(),
        source: ImageSource::Pexels,
        source_url: photo.url,
        alt_text: photo.alt.unwrap_or_default(),
        width: photo.width,
        height: photo.height,
        size: None,
        format: "jpg".to_string(),
        tags: Vec::new(),
        keyword: query.to_string(),
        crawl_date: Utc::now(),
    }
}

#[async_trait]
impl ImageBackend for PexelsBackend {
    fn source(&self) -> ImageSource {
        ImageSource::Pexels
    }

    fn is_available(&self) -> bool {
        self.config.key().is_some()
    }

    async fn search(&self, query: &str, count: usize) -> SourceResult<Vec<ImageRecord>> {
        let Some(key) = self.config.key() else {
            tracing::debug!("Pexels API key not found");
            return Ok(Vec::new());
        };

        let url = endpoint(self.config.base_url.as_deref(), DEFAULT_BASE_URL, "/v1/search");
        let per_page = page_size(self.source(), count).to_string();

        tracing::debug!("Searching Pexels for '{}' (per_page: {})", query, per_page);

        let request = self
            .client
            .get(&url)
            .header(AUTHORIZATION, key)
            .query(&[("query", query), ("per_page", per_page.as_str())]);

        let response: PexelsResponse = fetch_json(request).await?;

        Ok(response
            .photos
            .into_iter()
            .map(|photo| to_record(photo, query))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_medium_src_and_alt() {
        let photo: PexelsPhoto = serde_json::from_str(
            r#"{
                "id": 2014422,
                "width": 3024,
                "height": 3024,
                "url": "https://www.pexels.com/photo/2014422/",
                "alt": "Brown rocks during golden hour",
                "src": {
                    "original": "https://images.pexels.com/photos/2014422/a.jpeg",
                    "medium": "https://images.pexels.com/photos/2014422/a.jpeg?h=350"
                }
            }"#,
        )
        .unwrap();

        let record = to_record(photo, "rocks");
        assert_eq!(record.url, "https://images.pexels.com/photos/2014422/a.jpeg?h=350");
        assert_eq!(record.alt_text, "Brown rocks during golden hour");
        assert_eq!(record.source_url.as_deref(), Some("https://www.pexels.com/photo/2014422/"));
        assert_eq!((record.width, record.height), (Some(3024), Some(3024)));
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_null_alt_becomes_empty() {
        let photo: PexelsPhoto =
            serde_json::from_str(r#"{"alt": null, "src": {"medium": "m.jpg"}}"#).unwrap();
        let record = to_record(photo, "x");
        assert_eq!(record.alt_text, "");
        assert_eq!(record.url, "m.jpg");
    }
}
