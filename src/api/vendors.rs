use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, VendorDto, validation};
use crate::models::query::normalize;
use crate::models::vendor::VendorRecord;

#[derive(Debug, Deserialize)]
pub struct ListVendorsQuery {
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    50
}

/// `GET /api/vendors` — approved local listings only.
pub async fn list_vendors(
    State(state): State<Arc<AppState>>,
    Query(request): Query<ListVendorsQuery>,
) -> Result<Json<ApiResponse<Vec<VendorDto>>>, ApiError> {
    let limit = validation::validate_limit(request.limit)?;

    let category = request.category.as_deref().map(normalize);

    let rows = state
        .shared
        .store
        .list_vendors(
            category.as_deref(),
            request.city.as_deref(),
            request.state.as_deref(),
            limit,
        )
        .await?;

    let vendors = rows
        .into_iter()
        .map(|row| VendorDto::from(VendorRecord::from(row)))
        .collect();

    Ok(Json(ApiResponse::success(vendors)))
}
