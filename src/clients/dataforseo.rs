use reqwest::Client;
use serde::Deserialize;

use super::ProviderError;

const DATAFORSEO_API: &str = "https://api.dataforseo.com/v3";

/// Result depth per maps search; each call is billed, so this stays modest.
const DEFAULT_DEPTH: u32 = 20;

#[derive(Debug, Clone)]
pub struct DataForSeoConfig {
    pub base_url: String,
    pub login: String,
    pub password: String,
    pub language_code: String,
    pub depth: u32,
}

impl Default for DataForSeoConfig {
    fn default() -> Self {
        Self {
            base_url: DATAFORSEO_API.to_string(),
            login: String::new(),
            password: String::new(),
            language_code: "en".to_string(),
            depth: DEFAULT_DEPTH,
        }
    }
}

/// Google Maps business-listing search via the DataForSEO SERP API.
/// Performs exactly one HTTP call per method; retry decisions belong to the
/// caller ([`super::RetryPolicy`]) so billed calls stay observable.
#[derive(Clone)]
pub struct DataForSeoClient {
    client: Client,
    config: DataForSeoConfig,
}

/// A maps search result page. `cost` is the provider's billing for the call.
#[derive(Debug, Clone)]
pub struct MapsSearch {
    pub items: Vec<MapsListing>,
    pub cost: Option<f64>,
}

/// One business listing. Every field is optional: the upstream schema drifts
/// and missing data must read as "no data", not a decode failure.
#[derive(Debug, Clone, Deserialize)]
pub struct MapsListing {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub rating: Option<MapsRating>,
    #[serde(default)]
    pub rank_absolute: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapsRating {
    #[serde(default)]
    pub value: Option<f32>,
    #[serde(default)]
    pub votes_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(default)]
    cost: Option<f64>,
    #[serde(default)]
    tasks: Vec<ApiTask<T>>,
}

#[derive(Debug, Deserialize)]
struct ApiTask<T> {
    /// Null on failed tasks, hence not a plain Vec.
    #[serde(default)]
    result: Option<Vec<T>>,
}

#[derive(Debug, Default, Deserialize)]
struct MapsTaskResult {
    #[serde(default)]
    items: Vec<MapsListing>,
}

/// Raw location row from the provider's locations endpoint.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProviderLocationRow {
    pub location_code: i32,
    pub location_name: String,
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub location_code_parent: Option<i32>,
    #[serde(default)]
    pub country_iso_code: Option<String>,
    #[serde(default)]
    pub geo: Option<GeoPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl DataForSeoClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: DataForSeoConfig) -> Self {
        Self { client, config }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        !self.config.login.is_empty() && !self.config.password.is_empty()
    }

    /// Live Google Maps search for `keyword` scoped to a provider location
    /// code. Zero items is a successful, empty search.
    pub async fn search_maps(
        &self,
        keyword: &str,
        location_code: i32,
    ) -> Result<MapsSearch, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::Disabled);
        }

        let url = format!("{}/serp/google/maps/live/advanced", self.config.base_url);
        let body = serde_json::json!([{
            "keyword": keyword,
            "location_code": location_code,
            "language_code": self.config.language_code,
            "device": "desktop",
            "os": "windows",
            "depth": self.config.depth,
            "search_type": "maps",
            "local_search": true,
        }]);

        tracing::debug!(keyword, location_code, "maps search request");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.login, Some(&self.config.password))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::Auth);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
            });
        }

        let payload: ApiResponse<MapsTaskResult> = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        let items = payload
            .tasks
            .into_iter()
            .flat_map(|t| t.result.unwrap_or_default())
            .flat_map(|r| r.items)
            .collect::<Vec<_>>();

        if let Some(cost) = payload.cost {
            metrics::counter!("provider_cost_microdollars")
                .increment((cost * 1_000_000.0).max(0.0) as u64);
        }

        tracing::debug!(count = items.len(), cost = ?payload.cost, "maps search completed");

        Ok(MapsSearch {
            items,
            cost: payload.cost,
        })
    }

    /// Full location list for resolver syncs.
    pub async fn fetch_locations(&self) -> Result<Vec<ProviderLocationRow>, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::Disabled);
        }

        let url = format!("{}/serp/google/locations", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.login, Some(&self.config.password))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::Auth);
        }
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
            });
        }

        let payload: ApiResponse<ProviderLocationRow> = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(payload
            .tasks
            .into_iter()
            .flat_map(|t| t.result.unwrap_or_default())
            .collect())
    }
}
