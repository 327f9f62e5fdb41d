use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::clients::dataforseo::MapsListing;
use crate::clients::{DataForSeoClient, ProviderError, RetryPolicy};
use crate::db::Store;
use crate::models::query::{CacheKey, SearchQuery, normalize};
use crate::models::vendor::{Rating, VendorRecord, VendorSource};
use crate::services::fusion;
use crate::services::locations::{LocationService, ResolvedLocation};

/// Rows pulled from the local/social tables per search.
const TABLE_RESULT_LIMIT: u64 = 20;

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub results: Vec<VendorRecord>,
    pub source_breakdown: BTreeMap<&'static str, usize>,
    /// Provider results came from the cache (fresh or, when degraded, stale).
    pub cache_hit: bool,
    /// The provider could not be reached and the response is missing live
    /// provider data.
    pub partial: bool,
}

/// Orchestrates one vendor search: resolve location, consult the cache, fetch
/// from the provider on a miss, fuse with locally stored vendors, write back.
///
/// Within a request: cache-read happens before provider-fetch happens before
/// cache-write. Two concurrent requests for the same unseen key may both
/// fetch; the store's atomic upsert makes the duplicate write harmless.
pub struct SearchService {
    store: Store,
    dataforseo: Arc<DataForSeoClient>,
    locations: Arc<LocationService>,
    retry: RetryPolicy,
    cache_ttl_seconds: i64,
}

impl SearchService {
    #[must_use]
    pub const fn new(
        store: Store,
        dataforseo: Arc<DataForSeoClient>,
        locations: Arc<LocationService>,
        retry: RetryPolicy,
        cache_ttl_seconds: i64,
    ) -> Self {
        Self {
            store,
            dataforseo,
            locations,
            retry,
            cache_ttl_seconds,
        }
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome> {
        let resolved = self
            .locations
            .resolve_or_default(&query.city, &query.state)
            .await?;

        // Canonical display strings feed the cache key so "TX" and "Texas"
        // land on the same row.
        let canonical = SearchQuery {
            category: query.category.trim().to_string(),
            city: resolved.city.clone(),
            state: resolved.state.clone(),
            subcategory: query.subcategory.clone(),
        };
        let key = canonical.cache_key();
        // Table filters and the fusion fallback use the same normalized form
        // as the cache key, so producer and consumer can never diverge.
        let subcategory = key.subcategory.as_deref();

        let local = self
            .store
            .search_vendors(
                &key.category,
                subcategory,
                &resolved.city,
                &resolved.state,
                TABLE_RESULT_LIMIT,
            )
            .await?
            .into_iter()
            .map(VendorRecord::from)
            .collect::<Vec<_>>();

        let social = self
            .store
            .search_social_vendors(
                &key.category,
                subcategory,
                &resolved.city,
                &resolved.state,
                TABLE_RESULT_LIMIT,
            )
            .await?
            .into_iter()
            .map(VendorRecord::from)
            .collect::<Vec<_>>();

        let (provider, cache_hit, partial) =
            self.provider_results(&canonical, &key, &resolved).await?;

        let results = fusion::fuse(local, provider, social, subcategory);
        let source_breakdown = fusion::source_breakdown(&results);

        Ok(SearchOutcome {
            results,
            source_breakdown,
            cache_hit,
            partial,
        })
    }

    /// Cached provider rows when fresh; a live fetch-and-store on a miss.
    /// Provider failure degrades to stale cache, then to nothing — never to
    /// an error, so locally stored vendors still get served.
    async fn provider_results(
        &self,
        query: &SearchQuery,
        key: &CacheKey,
        resolved: &ResolvedLocation,
    ) -> Result<(Vec<VendorRecord>, bool, bool)> {
        if let Some(cached) = self.store.get_cached_search(key).await? {
            debug!(key = %key, "cache hit");
            metrics::counter!("search_cache_hits_total").increment(1);
            return Ok((cached.records, true, false));
        }

        metrics::counter!("search_cache_misses_total").increment(1);

        match self.fetch_and_store(query, key, resolved).await {
            Ok(records) => Ok((records, false, false)),
            Err(e) => {
                warn!(key = %key, error = %e, "provider fetch failed, degrading");
                metrics::counter!("search_provider_failures_total").increment(1);

                match self.store.get_stale_search(key).await? {
                    Some(stale) => {
                        debug!(key = %key, "serving stale cache entry");
                        Ok((stale.records, true, true))
                    }
                    None => Ok((Vec::new(), false, true)),
                }
            }
        }
    }

    async fn fetch_and_store(
        &self,
        query: &SearchQuery,
        key: &CacheKey,
        resolved: &ResolvedLocation,
    ) -> Result<Vec<VendorRecord>, ProviderError> {
        let keyword = query.provider_keyword();

        let search = self
            .retry
            .run(|| self.dataforseo.search_maps(&keyword, resolved.location_code))
            .await?;

        let records =
            listings_to_records(search.items, &key.category, &resolved.city, &resolved.state);

        if let Err(e) = self
            .store
            .cache_search_results(
                key,
                &records,
                resolved.location_code,
                search.cost,
                self.cache_ttl_seconds,
            )
            .await
        {
            warn!(key = %key, "failed to cache search results: {e}");
        }

        Ok(records)
    }
}

/// Convert provider listings into tagged records. Items without a title carry
/// nothing worth showing and are dropped.
pub(crate) fn listings_to_records(
    items: Vec<MapsListing>,
    category: &str,
    city: &str,
    state: &str,
) -> Vec<VendorRecord> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let name = item.title.filter(|t| !t.trim().is_empty())?;
            let rating = item
                .rating
                .and_then(|r| Rating::new(r.value?, r.votes_count.unwrap_or(0)));

            Some(VendorRecord {
                name,
                category: normalize(category),
                subcategory: None,
                description: item.description,
                address: item.address,
                city: city.to_string(),
                state: state.to_string(),
                phone: item.phone,
                email: None,
                website: item.url,
                instagram_handle: None,
                rating,
                place_id: item.place_id,
                rank: item
                    .rank_absolute
                    .unwrap_or_else(|| u32::try_from(idx + 1).unwrap_or(u32::MAX)),
                source: VendorSource::Provider,
            })
        })
        .collect()
}
