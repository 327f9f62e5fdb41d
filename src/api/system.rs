use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatus};

#[derive(Debug, Serialize)]
pub struct HealthLiveResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthReadinessChecks {
    pub database: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthReadyResponse {
    pub ready: bool,
    pub checks: HealthReadinessChecks,
}

/// `GET /api/system/status`
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let store = &state.shared.store;

    let status = SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        cached_searches: store.cached_search_count().await?,
        vendors: store.vendor_count().await?,
        social_vendors: store.social_vendor_count().await?,
        locations: store.location_count().await?,
        scheduler_enabled: state.shared.config.read().await.scheduler.enabled,
    };

    Ok(Json(ApiResponse::success(status)))
}

/// `GET /api/system/health/live`
pub async fn health_live() -> impl IntoResponse {
    Json(ApiResponse::success(HealthLiveResponse { status: "alive" }))
}

/// `GET /api/system/health/ready`
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = state.shared.store.ping().await.is_ok();

    Json(ApiResponse::success(HealthReadyResponse {
        ready: database,
        checks: HealthReadinessChecks { database },
    }))
}

/// `GET /api/system/metrics`
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}
