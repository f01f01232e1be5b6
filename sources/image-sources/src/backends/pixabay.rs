//! Pixabay backend
//!
//! See: https://pixabay.com/api/docs/#api_search_images

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use super::{endpoint, fetch_json, page_size, ImageBackend};
use crate::config::ApiKeyConfig;
use crate::error::SourceResult;
use crate::types::{ImageRecord, ImageSource};

const DEFAULT_BASE_URL: &str = "https://pixabay.com";

/// Pixabay answers 400 for `per_page` below this
const MIN_PER_PAGE: usize = 3;

/// Pixabay backend
pub struct PixabayBackend {
    client: Client,
    config: ApiKeyConfig,
}

impl PixabayBackend {
    pub fn new(client: Client, config: ApiKeyConfig) -> Self {
        Self { client, config }
    }
}

// Pixabay API response types
#[derive(Debug, Deserialize)]
struct PixabayResponse {
    #[serde(default)]
    hits: Vec<PixabayHit>,
}

#[derive(Debug, Deserialize)]
struct PixabayHit {
    #[serde(rename = "webformatURL")]
    webformat_url: Option<String>,
    #[serde(rename = "pageURL")]
    page_url: Option<String>,
    tags: Option<String>,
    #[serde(rename = "webformatWidth")]
    webformat_width: Option<u32>,
    #[serde(rename = "webformatHeight")]
    webformat_height: Option<u32>,
}

fn to_record(hit: PixabayHit, query: &str) -> ImageRecord {
    let tags_text = hit.tags.unwrap_or_default();
    let tags = if tags_text.is_empty() {
        Vec::new()
    } else {
        tags_text.split(", ").map(str::to_string).collect()
    };

    ImageRecord {
        url: hit.webformat_url.unwrap_or_default(),
        source: ImageSource::Pixabay,
        source_url: hit.page_url,
        alt_text: tags_text,
        width: hit.webformat_width,
        height: hit.webformat_height,
        size: None,
        // webformatURL is served as jpg
        format: "jpg".to_string(),
        tags,
        keyword: query.to_string(),
        crawl_date: Utc::now(),
    }
}

#[async_trait]
impl ImageBackend for PixabayBackend {
    fn source(&self) -> ImageSource {
        ImageSource::Pixabay
    }

    fn is_available(&self) -> bool {
        self.config.key().is_some()
    }

    async fn search(&self, query: &str, count: usize) -> SourceResult<Vec<ImageRecord>> {
        let Some(key) = self.config.key() else {
            tracing::debug!("Pixabay API key not found");
            return Ok(Vec::new());
        };

        let url = endpoint(self.config.base_url.as_deref(), DEFAULT_BASE_URL, "/api/");
        let per_page = page_size(self.source(), count)
            .max(MIN_PER_PAGE)
            .to_string();

        tracing::debug!("Searching Pixabay for '{}' (per_page: {})", query, per_page);

        let request = self.client.get(&url).query(&[
            ("key", key),
            ("q", query),
            ("image_type", "photo"),
            ("per_page", per_page.as_str()),
            ("safesearch", "true"),
        ]);

        let response: PixabayResponse = fetch_json(request).await?;

        Ok(response
            .hits
            .into_iter()
            .map(|hit| to_record(hit, query))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_split_into_list_and_kept_as_alt_text() {
        let hit: PixabayHit = serde_json::from_str(
            r#"{
                "webformatURL": "https://pixabay.com/get/a_640.jpg",
                "pageURL": "https://pixabay.com/photos/a-1/",
                "tags": "mountain, lake, sunrise",
                "webformatWidth": 640,
                "webformatHeight": 427
            }"#,
        )
        .unwrap();

        let record = to_record(hit, "mountain");
        assert_eq!(record.url, "https://pixabay.com/get/a_640.jpg");
        assert_eq!(record.alt_text, "mountain, lake, sunrise");
        assert_eq!(record.tags, vec!["mountain", "lake", "sunrise"]);
        assert_eq!(record.width, Some(640));
        assert_eq!(record.height, Some(427));
        assert_eq!(record.size, None);
        assert_eq!(record.format, "jpg");
    }

    #[test]
    fn test_missing_fields_map_to_empty() {
        let hit: PixabayHit = serde_json::from_str("{}").unwrap();
        let record = to_record(hit, "x");
        assert!(record.url.is_empty());
        assert!(record.tags.is_empty());
        assert!(record.source_url.is_none());
    }
}
