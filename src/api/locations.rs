use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, LocationDto, validation};
use crate::entities::provider_locations;

fn to_dto(row: provider_locations::Model) -> LocationDto {
    LocationDto {
        location_code: row.location_code,
        name: row.location_name,
        state_code: row.state_code,
        state_name: row.state_name,
    }
}

/// `GET /api/locations/states`
pub async fn list_states(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<LocationDto>>>, ApiError> {
    let states = state.shared.locations.states().await?;
    Ok(Json(ApiResponse::success(
        states.into_iter().map(to_dto).collect(),
    )))
}

/// `GET /api/locations/{state}/cities`
pub async fn list_cities(
    State(state): State<Arc<AppState>>,
    Path(state_name): Path<String>,
) -> Result<Json<ApiResponse<Vec<LocationDto>>>, ApiError> {
    let state_name = validation::validate_state(&state_name)?;

    let cities = state.shared.locations.cities(state_name).await?;
    Ok(Json(ApiResponse::success(
        cities.into_iter().map(to_dto).collect(),
    )))
}
