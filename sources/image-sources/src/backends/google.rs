//! Google Custom Search backend (image search type)
//!
//! See: https://developers.google.com/custom-search/v1/reference/rest/v1/cse/list

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use super::{endpoint, fetch_json, page_size, ImageBackend};
use crate::config::GoogleConfig;
use crate::error::SourceResult;
use crate::types::{ImageRecord, ImageSource};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// Google Custom Search backend
pub struct GoogleBackend {
    client: Client,
    config: GoogleConfig,
}

impl GoogleBackend {
    pub fn new(client: Client, config: GoogleConfig) -> Self {
        Self { client, config }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleItem {
    link: Option<String>,
    title: Option<String>,
    file_format: Option<String>,
    #[serde(default)]
    image: GoogleImage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleImage {
    context_link: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    byte_size: Option<u64>,
}

/// "image/png" -> "png"
fn mime_subtype(file_format: &str) -> String {
    let subtype = file_format
        .rsplit_once('/')
        .map(|(_, sub)| sub)
        .unwrap_or(file_format);
    subtype.trim().to_lowercase()
}

fn to_record(item: GoogleItem, query: &str) -> ImageRecord {
    ImageRecord {
        url: item.link.unwrap_or_default(),
        source: ImageSource::GoogleCustomSearch,
        source_url: item.image.context_link,
        alt_text: item.title.unwrap_or_default(),
        width: item.image.width,
        height: item.image.height,
        size: item.image.byte_size,
        format: item.file_format.as_deref().map(mime_subtype).unwrap_or_default(),
        tags: Vec::new(),
        keyword: query.to_string(),
        crawl_date: Utc::now(),
    }
}

#[async_trait]
impl ImageBackend for GoogleBackend {
    fn source(&self) -> ImageSource {
        ImageSource::GoogleCustomSearch
    }

    fn is_available(&self) -> bool {
        self.config.key().is_some() && self.config.cse_id().is_some()
    }

    async fn search(&self, query: &str, count: usize) -> SourceResult<Vec<ImageRecord>> {
        let (Some(key), Some(cse_id)) = (self.config.key(), self.config.cse_id()) else {
            tracing::debug!("Google Custom Search API key or CSE id not found");
            return Ok(Vec::new());
        };

        let url = endpoint(self.config.base_url.as_deref(), DEFAULT_BASE_URL, "/customsearch/v1");
        let num = page_size(self.source(), count).to_string();

        tracing::debug!("Searching Google Custom Search for '{}' (num: {})", query, num);

        let request = self.client.get(&url).query(&[
            ("key", key),
            ("cx", cse_id),
            ("q", query),
            ("searchType", "image"),
            ("num", num.as_str()),
        ]);

        let response: GoogleResponse = fetch_json(request).await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| to_record(item, query))
            .collect())
    }
}
