use std::sync::Arc;

use anyhow::Result;
use sea_orm::Set;
use serde::Serialize;
use tracing::{info, warn};

use crate::clients::dataforseo::ProviderLocationRow;
use crate::clients::{DataForSeoClient, RetryPolicy};
use crate::db::Store;
use crate::entities::provider_locations;

/// Country-level fallback code when a city has no mapping.
pub const DEFAULT_LOCATION_CODE: i32 = 2840;

/// Location data staleness threshold before a sync re-fetches.
const SYNC_MAX_AGE_DAYS: i64 = 30;

/// USPS code / full name pairs, used to accept abbreviations on input and to
/// backfill state codes when the provider only supplies names.
const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
];

/// Expand a USPS abbreviation to the full state name; anything else passes
/// through trimmed.
#[must_use]
pub fn expand_state(state: &str) -> String {
    let trimmed = state.trim();
    US_STATES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(trimmed))
        .map_or_else(|| trimmed.to_string(), |(_, name)| (*name).to_string())
}

#[must_use]
pub fn state_code_for(name: &str) -> Option<&'static str> {
    let trimmed = name.trim();
    US_STATES
        .iter()
        .find(|(code, full)| {
            full.eq_ignore_ascii_case(trimmed) || code.eq_ignore_ascii_case(trimmed)
        })
        .map(|(code, _)| *code)
}

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("unknown location: {city}, {state}")]
    UnknownLocation { city: String, state: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Canonical display strings plus the provider's location identifier.
#[derive(Debug, Clone)]
pub struct ResolvedLocation {
    pub city: String,
    pub state: String,
    pub location_code: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationSyncSummary {
    pub synced: usize,
    pub skipped: bool,
}

/// Maps (state, city) input to provider location codes, backed by the synced
/// `provider_locations` table. Pure lookups; the only mutation is `sync`.
pub struct LocationService {
    store: Store,
    dataforseo: Arc<DataForSeoClient>,
    retry: RetryPolicy,
}

impl LocationService {
    #[must_use]
    pub const fn new(store: Store, dataforseo: Arc<DataForSeoClient>, retry: RetryPolicy) -> Self {
        Self {
            store,
            dataforseo,
            retry,
        }
    }

    /// Resolve a (city, state) pair. Accepts state names or abbreviations.
    /// Callers should treat `UnknownLocation` as a cue to fall back to
    /// [`DEFAULT_LOCATION_CODE`], not to abort the search.
    pub async fn resolve(&self, city: &str, state: &str) -> Result<ResolvedLocation, LocationError> {
        let city = city.trim();
        let state_full = expand_state(state);

        if let Some(row) = self
            .store
            .find_city_location(city, &state_full)
            .await
            .map_err(LocationError::Other)?
        {
            return Ok(ResolvedLocation {
                city: row.location_name,
                state: row.state_name.unwrap_or(state_full),
                location_code: row.location_code,
            });
        }

        Err(LocationError::UnknownLocation {
            city: city.to_string(),
            state: state.trim().to_string(),
        })
    }

    /// Best-effort resolution for the search path: unknown locations degrade
    /// to the country-level code with pass-through display strings.
    pub async fn resolve_or_default(&self, city: &str, state: &str) -> Result<ResolvedLocation> {
        match self.resolve(city, state).await {
            Ok(resolved) => Ok(resolved),
            Err(LocationError::UnknownLocation { city, state }) => {
                warn!(%city, %state, "no location mapping, using country-level search");
                Ok(ResolvedLocation {
                    city,
                    state: expand_state(&state),
                    location_code: DEFAULT_LOCATION_CODE,
                })
            }
            Err(LocationError::Other(e)) => Err(e),
        }
    }

    pub async fn states(&self) -> Result<Vec<provider_locations::Model>> {
        self.store.list_states().await
    }

    pub async fn cities(&self, state: &str) -> Result<Vec<provider_locations::Model>> {
        self.store.list_cities_for_state(&expand_state(state)).await
    }

    /// Re-fetch the provider's US location list. Skipped when the stored set
    /// is younger than 30 days, unless `force` is set.
    pub async fn sync(&self, force: bool) -> Result<LocationSyncSummary> {
        if !force && !self.needs_sync().await? {
            info!("provider locations are up to date, skipping sync");
            return Ok(LocationSyncSummary {
                synced: 0,
                skipped: true,
            });
        }

        let rows = self
            .retry
            .run(|| self.dataforseo.fetch_locations())
            .await
            .map_err(|e| anyhow::anyhow!("location sync failed: {e}"))?;

        let models = transform_rows(rows);
        let synced = self.store.replace_locations(models).await?;

        info!(synced, "provider locations synced");
        Ok(LocationSyncSummary {
            synced,
            skipped: false,
        })
    }

    async fn needs_sync(&self) -> Result<bool> {
        if self.store.location_count().await? == 0 {
            return Ok(true);
        }

        let Some(oldest) = self.store.oldest_location_update().await? else {
            return Ok(true);
        };

        let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(&oldest) else {
            return Ok(true);
        };

        let age = chrono::Utc::now().signed_duration_since(parsed.with_timezone(&chrono::Utc));
        Ok(age.num_days() >= SYNC_MAX_AGE_DAYS)
    }
}

/// Provider rows come as "City,State,Country" display names; split them into
/// the columns the resolver queries. Non-US and unsupported types are
/// dropped.
fn transform_rows(rows: Vec<ProviderLocationRow>) -> Vec<provider_locations::ActiveModel> {
    let now = chrono::Utc::now().to_rfc3339();

    rows.into_iter()
        .filter(|row| {
            row.country_iso_code
                .as_deref()
                .is_some_and(|code| code.eq_ignore_ascii_case("US"))
        })
        .filter_map(|row| {
            let location_type = row.location_type.as_deref()?.to_lowercase();
            if !matches!(location_type.as_str(), "country" | "state" | "city") {
                return None;
            }

            let mut parts = row.location_name.split(',').map(str::trim);
            let name = parts.next()?.to_string();
            let state_name = match location_type.as_str() {
                "city" => parts.next().map(String::from),
                "state" => Some(name.clone()),
                _ => None,
            };
            let state_code = state_name
                .as_deref()
                .and_then(state_code_for)
                .map(String::from);

            Some(provider_locations::ActiveModel {
                location_code: Set(row.location_code),
                location_name: Set(name),
                location_type: Set(location_type),
                state_code: Set(state_code),
                state_name: Set(state_name),
                parent_location_code: Set(row.location_code_parent),
                country_code: Set("US".to_string()),
                latitude: Set(row.geo.as_ref().and_then(|g| g.lat)),
                longitude: Set(row.geo.as_ref().and_then(|g| g.lon)),
                last_updated: Set(now.clone()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::dataforseo::GeoPoint;

    #[test]
    fn test_expand_state() {
        assert_eq!(expand_state("TX"), "Texas");
        assert_eq!(expand_state("tx"), "Texas");
        assert_eq!(expand_state("Texas"), "Texas");
        assert_eq!(expand_state(" Puerto Rico "), "Puerto Rico");
    }

    #[test]
    fn test_state_code_for() {
        assert_eq!(state_code_for("Texas"), Some("TX"));
        assert_eq!(state_code_for("tx"), Some("TX"));
        assert_eq!(state_code_for("Atlantis"), None);
    }

    #[test]
    fn test_transform_rows_splits_names() {
        let rows = vec![
            ProviderLocationRow {
                location_code: 1_026_201,
                location_name: "Dallas,Texas,United States".into(),
                location_type: Some("City".into()),
                location_code_parent: Some(21_176),
                country_iso_code: Some("US".into()),
                geo: Some(GeoPoint {
                    lat: Some(32.77),
                    lon: Some(-96.79),
                }),
            },
            ProviderLocationRow {
                location_code: 21_176,
                location_name: "Texas,United States".into(),
                location_type: Some("State".into()),
                location_code_parent: Some(2840),
                country_iso_code: Some("US".into()),
                geo: None,
            },
            ProviderLocationRow {
                location_code: 9999,
                location_name: "Toronto,Ontario,Canada".into(),
                location_type: Some("City".into()),
                location_code_parent: None,
                country_iso_code: Some("CA".into()),
                geo: None,
            },
            ProviderLocationRow {
                location_code: 8888,
                location_name: "Dallas-Ft. Worth TX".into(),
                location_type: Some("DMA Region".into()),
                location_code_parent: None,
                country_iso_code: Some("US".into()),
                geo: None,
            },
        ];

        let models = transform_rows(rows);
        assert_eq!(models.len(), 2);

        let city = &models[0];
        assert_eq!(city.location_name.clone().unwrap(), "Dallas");
        assert_eq!(city.state_name.clone().unwrap(), Some("Texas".to_string()));
        assert_eq!(city.state_code.clone().unwrap(), Some("TX".to_string()));

        let state = &models[1];
        assert_eq!(state.location_name.clone().unwrap(), "Texas");
        assert_eq!(state.state_code.clone().unwrap(), Some("TX".to_string()));
    }
}
