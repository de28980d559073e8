//! REST API handlers for the map session
//!
//! These handlers use the shared MapService.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use geojson::GeoJson;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::service::{FilterUpdate, MapService, ViewState};
use crate::controller::UiEvent;
use crate::loader::LoadReport;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ZipListResponse {
    pub zips: Vec<String>,
}

#[derive(Serialize)]
pub struct StylesResponse {
    pub styles: Vec<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<MapService>;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/v1/status
pub async fn get_status(State(service): State<AppState>) -> Json<LoadReport> {
    Json(service.status().await)
}

/// GET /api/v1/view
pub async fn get_view(State(service): State<AppState>) -> Json<ViewState> {
    Json(service.view_state().await)
}

/// GET /api/v1/zips
pub async fn get_zips(State(service): State<AppState>) -> Json<ZipListResponse> {
    Json(ZipListResponse {
        zips: service.zips().await,
    })
}

/// GET /api/v1/zips/search?q=941
pub async fn search_zips(
    State(service): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<ZipListResponse> {
    let query = params.q.unwrap_or_default();
    Json(ZipListResponse {
        zips: service.search_zips(&query).await,
    })
}

/// GET /api/v1/zips/geojson
pub async fn get_zips_geojson(State(service): State<AppState>) -> Json<GeoJson> {
    Json(service.zips_geojson().await)
}

/// POST /api/v1/zips/:zip/select
///
/// Unknown codes reset the viewport rather than failing.
pub async fn select_zip(State(service): State<AppState>, Path(zip): Path<String>) -> Json<ViewState> {
    Json(service.dispatch(UiEvent::ZipSelected(zip)).await)
}

/// POST /api/v1/zips/:zip/hover
pub async fn hover_zip(State(service): State<AppState>, Path(zip): Path<String>) -> ApiResult<ViewState> {
    zip_event(&service, &zip, UiEvent::ZipHoverEnter(zip.clone())).await
}

/// POST /api/v1/zips/:zip/unhover
pub async fn unhover_zip(State(service): State<AppState>, Path(zip): Path<String>) -> ApiResult<ViewState> {
    zip_event(&service, &zip, UiEvent::ZipHoverExit(zip.clone())).await
}

/// POST /api/v1/zips/:zip/click
pub async fn click_zip(State(service): State<AppState>, Path(zip): Path<String>) -> ApiResult<ViewState> {
    zip_event(&service, &zip, UiEvent::ZipClick(zip.clone())).await
}

async fn zip_event(service: &MapService, zip: &str, event: UiEvent) -> ApiResult<ViewState> {
    if !service.has_zip(zip).await {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("ZIP code not found: {}", zip),
            }),
        ));
    }
    Ok(Json(service.dispatch(event).await))
}

/// GET /api/v1/styles
pub async fn get_styles(State(service): State<AppState>) -> Json<StylesResponse> {
    Json(StylesResponse {
        styles: service.styles().await,
    })
}

/// GET /api/v1/venues
pub async fn get_venues(State(service): State<AppState>) -> Json<GeoJson> {
    Json(service.venues_geojson().await)
}

/// POST /api/v1/filters
pub async fn update_filters(
    State(service): State<AppState>,
    Json(update): Json<FilterUpdate>,
) -> Json<ViewState> {
    Json(service.update_filters(update).await)
}

/// POST /api/v1/filters/clear
pub async fn clear_filters(State(service): State<AppState>) -> Json<ViewState> {
    Json(service.dispatch(UiEvent::FiltersCleared).await)
}

/// POST /api/v1/sidebar/toggle
pub async fn toggle_sidebar(State(service): State<AppState>) -> Json<ViewState> {
    Json(service.dispatch(UiEvent::SidebarToggled).await)
}
