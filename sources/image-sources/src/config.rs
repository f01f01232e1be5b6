//! Configuration for the image search backends
//!
//! Values are normally embedded in the harvester config file under `[sources]`.
//! API credentials can always be supplied via environment variables, which take
//! precedence over the file:
//!
//! - `PIXABAY_API_KEY`
//! - `PEXELS_API_KEY`
//! - `UNSPLASH_ACCESS_KEY`
//! - `GOOGLE_CUSTOM_SEARCH_API_KEY` / `GOOGLE_CSE_ID`

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration shared by all backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User agent sent with every API request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub pixabay: ApiKeyConfig,
    #[serde(default)]
    pub pexels: ApiKeyConfig,
    #[serde(default)]
    pub unsplash: ApiKeyConfig,
    #[serde(default)]
    pub google: GoogleConfig,
}

/// Credentials and endpoint for a key-only API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    /// API key (absent = backend disabled)
    #[serde(default)]
    pub api_key: Option<String>,
    /// API base URL override (the public endpoint when unset)
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Google Custom Search needs both an API key and a search engine id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    /// Programmable search engine id (`cx`)
    #[serde(default)]
    pub cse_id: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

// Default value functions
fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("image-harvester/{}", env!("CARGO_PKG_VERSION"))
}

impl ApiKeyConfig {
    pub fn key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }
}

impl GoogleConfig {
    pub fn key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }

    pub fn cse_id(&self) -> Option<&str> {
        non_blank(self.cse_id.as_deref())
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            pixabay: ApiKeyConfig::default(),
            pexels: ApiKeyConfig::default(),
            unsplash: ApiKeyConfig::default(),
            google: GoogleConfig::default(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl SourcesConfig {
    /// Override credentials from the environment (highest priority)
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("PIXABAY_API_KEY") {
            self.pixabay.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("PEXELS_API_KEY") {
            self.pexels.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("UNSPLASH_ACCESS_KEY") {
            self.unsplash.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("GOOGLE_CUSTOM_SEARCH_API_KEY") {
            self.google.api_key = Some(key);
        }
        if let Ok(id) = std::env::var("GOOGLE_CSE_ID") {
            self.google.cse_id = Some(id);
        }
    }

    /// Build the HTTP client shared by every backend
    pub fn build_client(&self) -> reqwest::Result<Client> {
        Client::builder()
            .user_agent(&self.user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }
}
