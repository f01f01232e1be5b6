//! Image Sources Library
//!
//! Stock-photo search backends normalized into a single [`ImageRecord`] shape.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use image_sources::{backends, search_or_empty, SourcesConfig};
//!
//! let config = SourcesConfig::default();
//! for backend in backends::all(&config)? {
//!     let images = search_or_empty(backend.as_ref(), "mountains", 10).await;
//! }
//! ```
//!
//! # Configuration
//! API keys come from `PIXABAY_API_KEY`, `PEXELS_API_KEY`, `UNSPLASH_ACCESS_KEY`,
//! `GOOGLE_CUSTOM_SEARCH_API_KEY` and `GOOGLE_CSE_ID`, or from the harvester config file.

pub mod backends;
pub mod config;
pub mod error;
pub mod types;

pub use backends::{search_or_empty, ImageBackend};
pub use config::SourcesConfig;
pub use error::{SourceError, SourceResult};
pub use types::{ImageRecord, ImageSource};
