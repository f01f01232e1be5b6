//! Shared application state

use anyhow::Result;
use reqwest::Client;
use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::config::Config;
use crate::jobs::JobManager;
use crate::storage::Storage;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Job and image store
    pub store: Arc<dyn Storage>,
    /// Creates and runs crawl jobs
    pub jobs: JobManager,
    /// Client for archive downloads
    pub http: Client,
    /// Limit applied when a crawl request omits one
    pub default_limit: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn Storage>, aggregator: Arc<Aggregator>, http: Client) -> Self {
        Self {
            jobs: JobManager::new(store.clone(), aggregator),
            store,
            http,
            default_limit: 10,
        }
    }

    /// Wire up the sources and HTTP client from configuration
    pub fn from_config(store: Arc<dyn Storage>, config: &Config) -> Result<Self> {
        let aggregator = Aggregator::from_config(&config.sources)?
            .surface_source_errors(config.crawl.surface_source_errors);
        let http = config.sources.build_client()?;

        let mut state = Self::new(store, Arc::new(aggregator), http);
        state.default_limit = config.crawl.default_limit;
        Ok(state)
    }
}
