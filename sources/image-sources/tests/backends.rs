//! Integration tests for the image search backends
//!
//! Each backend is pointed at a wiremock server standing in for the real API.

use image_sources::backends::{GoogleBackend, PexelsBackend, PixabayBackend, UnsplashBackend};
use image_sources::config::{ApiKeyConfig, GoogleConfig};
use image_sources::{search_or_empty, ImageBackend, ImageSource, SourceError};
use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn key_config(server: &MockServer, key: Option<&str>) -> ApiKeyConfig {
    ApiKeyConfig {
        api_key: key.map(str::to_string),
        base_url: Some(server.uri()),
    }
}

#[tokio::test]
async fn test_pixabay_sends_query_and_maps_hits() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(query_param("key", "pixa-key"))
        .and(query_param("q", "red panda"))
        .and(query_param("image_type", "photo"))
        .and(query_param("per_page", "200"))
        .and(query_param("safesearch", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "hits": [
                {
                    "webformatURL": "https://cdn.pixabay.com/a_640.jpg",
                    "pageURL": "https://pixabay.com/photos/a/",
                    "tags": "red panda, animal",
                    "webformatWidth": 640,
                    "webformatHeight": 480
                },
                { "pageURL": "https://pixabay.com/photos/b/", "tags": "" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = PixabayBackend::new(Client::new(), key_config(&server, Some("pixa-key")));
    // Requests above the page cap are clamped
    let images = backend.search("red panda", 500).await.unwrap();

    assert_eq!(images.len(), 2);
    assert_eq!(images[0].source, ImageSource::Pixabay);
    assert_eq!(images[0].tags, vec!["red panda", "animal"]);
    assert_eq!(images[0].keyword, "red panda");
    // The adapter keeps url-less items; the aggregator drops them
    assert!(images[1].url.is_empty());
}

#[tokio::test]
async fn test_pixabay_small_counts_request_minimum_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(query_param("per_page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hits": [] })))
        .expect(2)
        .mount(&server)
        .await;

    let backend = PixabayBackend::new(Client::new(), key_config(&server, Some("pixa-key")));
    assert!(backend.search("owl", 1).await.unwrap().is_empty());
    assert!(backend.search("owl", 2).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pexels_uses_authorization_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(header("Authorization", "pexels-key"))
        .and(query_param("query", "city"))
        .and(query_param("per_page", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "photos": [{
                "url": "https://www.pexels.com/photo/1/",
                "alt": "Night skyline",
                "width": 6000,
                "height": 4000,
                "src": { "medium": "https://images.pexels.com/1.jpeg?h=350" }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = PexelsBackend::new(Client::new(), key_config(&server, Some("pexels-key")));
    let images = backend.search("city", 5).await.unwrap();

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].url, "https://images.pexels.com/1.jpeg?h=350");
    assert_eq!(images[0].alt_text, "Night skyline");
    assert_eq!(images[0].width, Some(6000));
}

#[tokio::test]
async fn test_unsplash_passes_dimensions_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .and(header("Authorization", "Client-ID unsplash-key"))
        .and(query_param("orientation", "landscape"))
        .and(query_param("per_page", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "results": [{
                "width": 5472,
                "height": 3648,
                "alt_description": "snowy mountain peak",
                "urls": { "regular": "https://images.unsplash.com/photo-1?w=1080" },
                "links": { "html": "https://unsplash.com/photos/1" },
                "tags": [{ "title": "mountain" }, { "title": "snow" }]
            }]
        })))
        .mount(&server)
        .await;

    let backend = UnsplashBackend::new(Client::new(), key_config(&server, Some("unsplash-key")));
    let images = backend.search("mountain", 100).await.unwrap();

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].width, Some(5472));
    assert_eq!(images[0].height, Some(3648));
    assert_eq!(images[0].tags, vec!["mountain", "snow"]);
}

#[tokio::test]
async fn test_google_requires_key_and_engine_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("cx", "engine-1"))
        .and(query_param("searchType", "image"))
        .and(query_param("num", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "title": "Lighthouse",
                "link": "https://example.org/lighthouse.webp",
                "fileFormat": "image/webp",
                "image": { "contextLink": "https://example.org", "width": 800, "height": 600, "byteSize": 51200 }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let without_cx = GoogleBackend::new(
        Client::new(),
        GoogleConfig {
            api_key: Some("g-key".to_string()),
            cse_id: None,
            base_url: Some(server.uri()),
        },
    );
    assert!(!without_cx.is_available());
    assert!(without_cx.search("lighthouse", 10).await.unwrap().is_empty());

    let backend = GoogleBackend::new(
        Client::new(),
        GoogleConfig {
            api_key: Some("g-key".to_string()),
            cse_id: Some("engine-1".to_string()),
            base_url: Some(server.uri()),
        },
    );
    let images = backend.search("lighthouse", 25).await.unwrap();

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].format, "webp");
    assert_eq!(images[0].size, Some(51200));
}

#[tokio::test]
async fn test_missing_key_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "photos": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let backend = PexelsBackend::new(Client::new(), key_config(&server, None));
    assert!(!backend.is_available());
    assert!(backend.search("anything", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_error_status_is_reported_and_collapsed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .respond_with(ResponseTemplate::new(401).set_body_string("OAuth error: invalid token"))
        .mount(&server)
        .await;

    let backend = UnsplashBackend::new(Client::new(), key_config(&server, Some("bad")));

    match backend.search("cats", 10).await {
        Err(SourceError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid token"));
        }
        other => panic!("expected status error, got {:?}", other),
    }

    assert!(search_or_empty(&backend, "cats", 10).await.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let backend = PixabayBackend::new(Client::new(), key_config(&server, Some("k")));
    let result = backend.search("cats", 10).await;

    assert!(matches!(result, Err(SourceError::Decode(_))));
}
