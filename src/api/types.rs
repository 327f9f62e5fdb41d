use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::vendor::{Rating, VendorRecord};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResultsDto {
    pub results: Vec<VendorDto>,
    pub total_results: usize,
    pub source_breakdown: BTreeMap<&'static str, usize>,
    pub cache_hit: bool,
    /// Set when the provider was unreachable and the list is missing live
    /// provider data.
    pub partial: bool,
}

#[derive(Debug, Serialize)]
pub struct VendorDto {
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    pub rank: u32,
    pub source: &'static str,
}

impl From<VendorRecord> for VendorDto {
    fn from(record: VendorRecord) -> Self {
        Self {
            source: record.source.as_str(),
            name: record.name,
            category: record.category,
            subcategory: record.subcategory,
            description: record.description,
            address: record.address,
            city: record.city,
            state: record.state,
            phone: record.phone,
            email: record.email,
            website: record.website,
            instagram_handle: record.instagram_handle,
            rating: record.rating,
            place_id: record.place_id,
            rank: record.rank,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LocationDto {
    pub location_code: i32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub cached_searches: u64,
    pub vendors: u64,
    pub social_vendors: u64,
    pub locations: u64,
    pub scheduler_enabled: bool,
}
