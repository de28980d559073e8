//! REST surface for the map session
//!
//! A browser page drives the map through these endpoints: each UI control
//! posts its event and redraws from the returned view state and layers.

pub mod handlers;
pub mod service;

pub use service::MapService;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(service: Arc<MapService>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and load status
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/status", get(handlers::get_status))
        .route("/api/v1/view", get(handlers::get_view))
        // ZIP navigation
        .route("/api/v1/zips", get(handlers::get_zips))
        .route("/api/v1/zips/search", get(handlers::search_zips))
        .route("/api/v1/zips/geojson", get(handlers::get_zips_geojson))
        .route("/api/v1/zips/:zip/select", post(handlers::select_zip))
        .route("/api/v1/zips/:zip/hover", post(handlers::hover_zip))
        .route("/api/v1/zips/:zip/unhover", post(handlers::unhover_zip))
        .route("/api/v1/zips/:zip/click", post(handlers::click_zip))
        // Bars and filters
        .route("/api/v1/styles", get(handlers::get_styles))
        .route("/api/v1/venues", get(handlers::get_venues))
        .route("/api/v1/filters", post(handlers::update_filters))
        .route("/api/v1/filters/clear", post(handlers::clear_filters))
        // Layout
        .route("/api/v1/sidebar/toggle", post(handlers::toggle_sidebar))
        // State and middleware
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
