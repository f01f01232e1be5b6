//! Common types for image search results
//!
//! Every backend maps its native response into [`ImageRecord`] so the rest of
//! the harvester never sees a source-specific shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type for parsing ImageSource from string
#[derive(Debug, Clone)]
pub struct ParseImageSourceError(String);

impl fmt::Display for ParseImageSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown image source: {}", self.0)
    }
}

impl std::error::Error for ParseImageSourceError {}

/// The external API an image was discovered through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageSource {
    Pixabay,
    Pexels,
    Unsplash,
    #[serde(rename = "Google Custom Search")]
    GoogleCustomSearch,
}

impl ImageSource {
    /// All sources in aggregation priority order
    pub const PRIORITY: [ImageSource; 4] = [
        ImageSource::Pixabay,
        ImageSource::Pexels,
        ImageSource::Unsplash,
        ImageSource::GoogleCustomSearch,
    ];

    /// Display name, also used as the stored value
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSource::Pixabay => "Pixabay",
            ImageSource::Pexels => "Pexels",
            ImageSource::Unsplash => "Unsplash",
            ImageSource::GoogleCustomSearch => "Google Custom Search",
        }
    }

    /// Short lowercase name used on the command line and in config sections
    pub fn slug(&self) -> &'static str {
        match self {
            ImageSource::Pixabay => "pixabay",
            ImageSource::Pexels => "pexels",
            ImageSource::Unsplash => "unsplash",
            ImageSource::GoogleCustomSearch => "google",
        }
    }

    /// Maximum number of results the API returns for a single request
    pub fn per_page_cap(&self) -> usize {
        match self {
            ImageSource::Pixabay => 200,
            ImageSource::Pexels => 80,
            ImageSource::Unsplash => 30,
            ImageSource::GoogleCustomSearch => 10,
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSource {
    type Err = ParseImageSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageSource::PRIORITY
            .into_iter()
            .find(|source| {
                s.eq_ignore_ascii_case(source.as_str()) || s.eq_ignore_ascii_case(source.slug())
            })
            .ok_or_else(|| ParseImageSourceError(s.to_string()))
    }
}

/// One discovered image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Direct location of the image file
    pub url: String,
    /// The API that returned it
    pub source: ImageSource,
    /// Page hosting the image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Free-text description, may be empty
    #[serde(default)]
    pub alt_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// File size in bytes (rarely known)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Lowercase file-extension-like format, e.g. "jpg"
    pub format: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// The query that produced this record
    pub keyword: String,
    /// When the record was collected
    pub crawl_date: DateTime<Utc>,
}

impl ImageRecord {
    /// Records without a URL are never kept
    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Attach the job keyword and collection time
    pub fn stamp(&mut self, keyword: &str, crawl_date: DateTime<Utc>) {
        self.keyword = keyword.to_string();
        self.crawl_date = crawl_date;
    }
}
