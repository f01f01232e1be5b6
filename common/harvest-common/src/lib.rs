//! Harvest Common - Shared utilities for the image harvester crates
//!
//! - **Initialization**: [`init_tracing`] for standardized logging setup
//! - **Errors**: [`ApiError`] and helpers for JSON error responses at the HTTP boundary
//!
//! # Example
//!
//! ```rust,ignore
//! use harvest_common::{init_tracing, not_found, ApiResult};
//!
//! init_tracing("harvester", 0)?;
//!
//! async fn handler() -> ApiResult<Json<Job>> {
//!     let job = lookup().ok_or_else(|| not_found("Job not found"))?;
//!     Ok(Json(job))
//! }
//! ```

pub mod error;
pub mod init;

// Re-export commonly used items at crate root
pub use error::{bad_request, internal_error, not_found, ApiError, ApiResult, ErrorResponse, ResultExt};
pub use init::init_tracing;
