//! HTTP API server
//!
//! JSON endpoints for starting crawls, inspecting jobs and browsing or
//! downloading stored images.

pub mod api;
pub mod state;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Start the web server
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting web server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Crawl jobs
        .route("/crawl", post(api::start_crawl))
        .route("/crawl/jobs", get(api::list_jobs))
        .route("/crawl/jobs/:id", get(api::get_job))
        // Images
        .route("/images", get(api::list_images))
        .route("/images/download", get(api::download_images))
        .route("/stats", get(api::stats));

    Router::new()
        .route("/health", get(api::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
