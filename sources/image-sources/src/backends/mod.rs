//! Image search backend implementations
//!
//! This module provides a trait-based abstraction over the stock-photo APIs.
//! Each backend issues exactly one bounded request per call and maps the
//! native response into [`ImageRecord`]s.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::config::SourcesConfig;
use crate::error::{SourceError, SourceResult};
use crate::types::{ImageRecord, ImageSource};

pub mod google;
pub mod pexels;
pub mod pixabay;
pub mod unsplash;

pub use google::GoogleBackend;
pub use pexels::PexelsBackend;
pub use pixabay::PixabayBackend;
pub use unsplash::UnsplashBackend;

/// Longest error body kept in [`SourceError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// Trait for image search backends
///
/// `search` reports failures as [`SourceError`]. Callers that want the coarse
/// "failure means no results" contract use [`search_or_empty`].
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// The API this backend talks to
    fn source(&self) -> ImageSource;

    /// Check if credentials for this backend are configured
    fn is_available(&self) -> bool;

    /// Perform one image search request
    ///
    /// `count` is clamped to the API's page cap. Returns an empty list without
    /// touching the network when the backend is not configured.
    async fn search(&self, query: &str, count: usize) -> SourceResult<Vec<ImageRecord>>;
}

/// Search one backend, collapsing any failure into an empty result
pub async fn search_or_empty(
    backend: &dyn ImageBackend,
    query: &str,
    count: usize,
) -> Vec<ImageRecord> {
    match backend.search(query, count).await {
        Ok(images) => images,
        Err(e) => {
            tracing::warn!("Error searching {} images: {}", backend.source(), e);
            Vec::new()
        }
    }
}

/// Build the backend for one source
pub fn for_source(
    source: ImageSource,
    config: &SourcesConfig,
    client: Client,
) -> Arc<dyn ImageBackend> {
    match source {
        ImageSource::Pixabay => Arc::new(PixabayBackend::new(client, config.pixabay.clone())),
        ImageSource::Pexels => Arc::new(PexelsBackend::new(client, config.pexels.clone())),
        ImageSource::Unsplash => Arc::new(UnsplashBackend::new(client, config.unsplash.clone())),
        ImageSource::GoogleCustomSearch => {
            Arc::new(GoogleBackend::new(client, config.google.clone()))
        }
    }
}

/// Build every backend in priority order, sharing one HTTP client
pub fn all(config: &SourcesConfig) -> SourceResult<Vec<Arc<dyn ImageBackend>>> {
    let client = config.build_client()?;

    let backends: Vec<Arc<dyn ImageBackend>> = ImageSource::PRIORITY
        .into_iter()
        .map(|source| for_source(source, config, client.clone()))
        .collect();

    for backend in &backends {
        if !backend.is_available() {
            tracing::info!("{} credentials not configured, source disabled", backend.source());
        }
    }

    Ok(backends)
}

/// Clamp a requested count to what one request to `source` may return
pub(crate) fn page_size(source: ImageSource, count: usize) -> usize {
    count.clamp(1, source.per_page_cap())
}

/// Join a base URL and an endpoint path
pub(crate) fn endpoint(base_url: Option<&str>, default_base: &str, path: &str) -> String {
    let base = base_url.unwrap_or(default_base).trim_end_matches('/');
    format!("{}{}", base, path)
}

/// Send a request and decode a JSON body, mapping every failure to [`SourceError`]
pub(crate) async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> SourceResult<T> {
    let response = request.send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            body.truncate(cut);
        }
        return Err(SourceError::Status { status, body });
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| SourceError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_clamps_to_cap() {
        assert_eq!(page_size(ImageSource::Pixabay, 500), 200);
        assert_eq!(page_size(ImageSource::Pexels, 500), 80);
        assert_eq!(page_size(ImageSource::Unsplash, 12), 12);
        assert_eq!(page_size(ImageSource::GoogleCustomSearch, 0), 1);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            endpoint(Some("http://localhost:1234/"), "https://x", "/v1/search"),
            "http://localhost:1234/v1/search"
        );
        assert_eq!(
            endpoint(None, "https://api.pexels.com", "/v1/search"),
            "https://api.pexels.com/v1/search"
        );
    }

    #[test]
    fn test_all_returns_priority_order() {
        let backends = all(&SourcesConfig::default()).unwrap();
        let order: Vec<ImageSource> = backends.iter().map(|b| b.source()).collect();
        assert_eq!(order, ImageSource::PRIORITY.to_vec());
        assert!(backends.iter().all(|b| !b.is_available()));
    }
}
