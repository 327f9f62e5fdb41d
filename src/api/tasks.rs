use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::{LocationSyncSummary, RefreshSummary};

/// `POST /api/tasks/refresh` — run one sweep now and report the counts.
pub async fn trigger_refresh(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<RefreshSummary>>, ApiError> {
    let summary = state
        .shared
        .refresh_service
        .sweep()
        .await
        .map_err(|e| ApiError::internal(format!("Refresh sweep failed: {}", e)))?;

    Ok(Json(ApiResponse::success(summary)))
}

/// `POST /api/tasks/locations/sync`
pub async fn trigger_location_sync(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<LocationSyncSummary>>, ApiError> {
    let summary = state
        .shared
        .locations
        .sync(false)
        .await
        .map_err(|e| ApiError::provider_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(summary)))
}
