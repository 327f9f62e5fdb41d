use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::info;

use super::{ApiError, ApiResponse, AppState, SearchResultsDto, VendorDto, validation};
use crate::models::query::SearchQuery;

/// `POST /api/search`
///
/// A provider outage is not an HTTP error here: the response degrades to
/// cached/locally-stored rows with `partial` set instead.
pub async fn search_vendors(
    State(state): State<Arc<AppState>>,
    Json(query): Json<SearchQuery>,
) -> Result<Json<ApiResponse<SearchResultsDto>>, ApiError> {
    validation::validate_search_query(&query)?;

    let outcome = state
        .shared
        .search_service
        .search(&query)
        .await
        .map_err(|e| ApiError::internal(format!("Search failed: {}", e)))?;

    info!(
        category = %query.category,
        city = %query.city,
        state = %query.state,
        results = outcome.results.len(),
        cache_hit = outcome.cache_hit,
        partial = outcome.partial,
        "search served"
    );

    let dto = SearchResultsDto {
        total_results: outcome.results.len(),
        source_breakdown: outcome.source_breakdown,
        cache_hit: outcome.cache_hit,
        partial: outcome.partial,
        results: outcome.results.into_iter().map(VendorDto::from).collect(),
    };

    Ok(Json(ApiResponse::success(dto)))
}
