//! Multi-source image collection
//!
//! Sources are queried one after another in priority order until the
//! requested number of records has been collected.

use chrono::Utc;
use image_sources::{backends, search_or_empty, ImageBackend, ImageRecord, SourcesConfig};
use std::sync::Arc;

/// Records and error strings gathered by one [`Aggregator::collect`] call
#[derive(Debug, Default)]
pub struct Collection {
    pub images: Vec<ImageRecord>,
    pub errors: Vec<String>,
}

/// Drives image backends under a global result cap
pub struct Aggregator {
    backends: Vec<Arc<dyn ImageBackend>>,
    surface_source_errors: bool,
}

impl Aggregator {
    /// Backends are queried in the order given
    pub fn new(backends: Vec<Arc<dyn ImageBackend>>) -> Self {
        Self {
            backends,
            surface_source_errors: false,
        }
    }

    /// All four sources in priority order
    pub fn from_config(config: &SourcesConfig) -> anyhow::Result<Self> {
        Ok(Self::new(backends::all(config)?))
    }

    /// Record failing sources as `API Error from <source>: <error>` instead of
    /// treating them as empty
    pub fn surface_source_errors(mut self, enabled: bool) -> Self {
        self.surface_source_errors = enabled;
        self
    }

    /// Collect up to `limit` records for `keyword`
    pub async fn collect(&self, keyword: &str, limit: usize) -> Collection {
        let mut collection = Collection::default();
        let crawl_date = Utc::now();

        for backend in &self.backends {
            let remaining = limit.saturating_sub(collection.images.len());
            if remaining == 0 {
                break;
            }

            let source = backend.source();
            let count = remaining.min(source.per_page_cap());
            tracing::debug!(%source, count, "Querying image source");

            let batch = if self.surface_source_errors {
                match backend.search(keyword, count).await {
                    Ok(images) => images,
                    Err(e) => {
                        tracing::warn!(%source, error = %e, "Image source failed");
                        collection
                            .errors
                            .push(format!("API Error from {}: {}", source, e));
                        continue;
                    }
                }
            } else {
                search_or_empty(backend.as_ref(), keyword, count).await
            };

            let before = collection.images.len();
            for mut image in batch {
                if collection.images.len() >= limit {
                    break;
                }
                if !image.has_url() {
                    continue;
                }
                image.stamp(keyword, crawl_date);
                collection.images.push(image);
            }

            tracing::info!(
                %source,
                added = collection.images.len() - before,
                total = collection.images.len(),
                "Collected images"
            );
        }

        if collection.images.len() < limit {
            collection.errors.push(format!(
                "Collected {} of {} requested images; backup crawling not implemented",
                collection.images.len(),
                limit
            ));
        }

        collection
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use image_sources::{ImageSource, SourceError, SourceResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend returning a fixed number of records and counting calls
    pub(crate) struct FakeBackend {
        pub source: ImageSource,
        pub results: usize,
        pub blank_urls: usize,
        pub fail: bool,
        pub available: bool,
        pub calls: AtomicUsize,
        pub last_count: AtomicUsize,
    }

    impl FakeBackend {
        pub(crate) fn new(source: ImageSource, results: usize) -> Self {
            Self {
                source,
                results,
                blank_urls: 0,
                fail: false,
                available: true,
                calls: AtomicUsize::new(0),
                last_count: AtomicUsize::new(0),
            }
        }

        pub(crate) fn returning(source: ImageSource, results: usize) -> Arc<Self> {
            Arc::new(Self::new(source, results))
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    pub(crate) fn image(source: ImageSource, url: &str) -> ImageRecord {
        ImageRecord {
            url: url.to_string(),
            source,
            source_url: None,
            alt_text: String::new(),
            width: Some(100),
            height: Some(50),
            size: None,
            format: "jpg".to_string(),
            tags: Vec::new(),
            keyword: String::new(),
            crawl_date: Utc::now(),
        }
    }

    #[async_trait]
    impl ImageBackend for FakeBackend {
        fn source(&self) -> ImageSource {
            self.source
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn search(&self, _query: &str, count: usize) -> SourceResult<Vec<ImageRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_count.store(count, Ordering::SeqCst);
            if !self.available {
                return Ok(Vec::new());
            }
            if self.fail {
                return Err(SourceError::Status {
                    status: 500,
                    body: "upstream down".to_string(),
                });
            }
            // ignores `count` so the caller's own cap is exercised
            let blanks = (0..self.blank_urls).map(|_| image(self.source, ""));
            let images = (0..self.results)
                .map(|i| image(self.source, &format!("https://{}/{}.jpg", self.source.slug(), i)));
            Ok(blanks.chain(images).collect())
        }
    }

    fn four(counts: [usize; 4]) -> Vec<Arc<FakeBackend>> {
        ImageSource::PRIORITY
            .iter()
            .zip(counts)
            .map(|(source, n)| FakeBackend::returning(*source, n))
            .collect()
    }

    fn aggregator(fakes: &[Arc<FakeBackend>]) -> Aggregator {
        Aggregator::new(
            fakes
                .iter()
                .map(|f| f.clone() as Arc<dyn ImageBackend>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_stops_at_limit_and_skips_later_sources() {
        let fakes = four([3, 0, 5, 2]);
        let collection = aggregator(&fakes).collect("lake", 8).await;

        assert_eq!(collection.images.len(), 8);
        assert!(collection.errors.is_empty());
        assert_eq!(fakes[3].calls(), 0);
        assert_eq!(fakes[1].last_count.load(Ordering::SeqCst), 5);
        assert!(collection.images.iter().all(|i| i.keyword == "lake"));
    }

    #[tokio::test]
    async fn test_requests_never_exceed_source_cap() {
        let fakes = four([0, 0, 0, 0]);
        aggregator(&fakes).collect("lake", 500).await;

        for fake in &fakes {
            assert_eq!(
                fake.last_count.load(Ordering::SeqCst),
                fake.source.per_page_cap()
            );
        }
    }

    #[tokio::test]
    async fn test_truncates_mid_batch() {
        let fakes = four([10, 10, 0, 0]);
        let collection = aggregator(&fakes).collect("lake", 4).await;
        assert_eq!(collection.images.len(), 4);
        assert_eq!(fakes[1].calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_urls_are_dropped() {
        let blanky = Arc::new(FakeBackend {
            blank_urls: 2,
            ..FakeBackend::new(ImageSource::Pixabay, 3)
        });
        let collection = aggregator(&[blanky]).collect("lake", 10).await;

        assert_eq!(collection.images.len(), 3);
        assert!(collection.images.iter().all(|i| i.has_url()));
    }

    #[tokio::test]
    async fn test_all_empty_records_shortfall() {
        let fakes = four([0, 0, 0, 0]);
        let collection = aggregator(&fakes).collect("lake", 5).await;

        assert!(collection.images.is_empty());
        assert_eq!(
            collection.errors,
            vec!["Collected 0 of 5 requested images; backup crawling not implemented"]
        );
        assert!(fakes.iter().all(|f| f.calls() == 1));
    }

    #[tokio::test]
    async fn test_missing_credentials_add_no_error() {
        let mut fakes = four([0, 4, 0, 0]);
        fakes[0] = Arc::new(FakeBackend {
            available: false,
            ..FakeBackend::new(ImageSource::Pixabay, 9)
        });
        let collection = aggregator(&fakes).collect("lake", 4).await;

        assert_eq!(collection.images.len(), 4);
        assert!(collection.errors.is_empty());
    }

    #[tokio::test]
    async fn test_failing_source_is_silent_by_default() {
        let mut fakes = four([0, 2, 0, 0]);
        fakes[0] = Arc::new(FakeBackend {
            fail: true,
            ..FakeBackend::new(ImageSource::Pixabay, 0)
        });
        let collection = aggregator(&fakes).collect("lake", 2).await;

        assert_eq!(collection.images.len(), 2);
        assert!(collection.errors.is_empty());
    }

    #[tokio::test]
    async fn test_failing_source_surfaces_when_enabled() {
        let mut fakes = four([0, 2, 0, 0]);
        fakes[0] = Arc::new(FakeBackend {
            fail: true,
            ..FakeBackend::new(ImageSource::Pixabay, 0)
        });
        let collection = aggregator(&fakes)
            .surface_source_errors(true)
            .collect("lake", 2)
            .await;

        assert_eq!(collection.images.len(), 2);
        assert_eq!(collection.errors.len(), 1);
        assert!(collection.errors[0].starts_with("API Error from Pixabay: "));
    }
}
