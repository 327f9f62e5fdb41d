use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clients::{DataForSeoClient, RetryPolicy};
use crate::db::{ExpiredSearch, Store};
use crate::models::query::CacheKey;
use crate::services::search::listings_to_records;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RefreshSummary {
    pub refreshed: u32,
    pub failed: u32,
}

/// Re-populates expired cache rows: sweep once, then fetch-and-store each key
/// found at sweep start. One key's failure is counted and skipped, never
/// propagated — the rest of the sweep always runs. With nothing expired the
/// sweep is a no-op, so back-to-back runs are safe.
pub struct RefreshService {
    store: Store,
    dataforseo: Arc<DataForSeoClient>,
    retry: RetryPolicy,
    cache_ttl_seconds: i64,
    delay_seconds: u32,
}

impl RefreshService {
    #[must_use]
    pub const fn new(
        store: Store,
        dataforseo: Arc<DataForSeoClient>,
        retry: RetryPolicy,
        cache_ttl_seconds: i64,
        delay_seconds: u32,
    ) -> Self {
        Self {
            store,
            dataforseo,
            retry,
            cache_ttl_seconds,
            delay_seconds,
        }
    }

    pub async fn sweep(&self) -> Result<RefreshSummary> {
        let expired = self.store.sweep_expired_searches().await?;

        if expired.is_empty() {
            debug!("no expired cache entries");
            return Ok(RefreshSummary::default());
        }

        info!("Refreshing {} expired cache entries", expired.len());
        let mut summary = RefreshSummary::default();

        for entry in expired {
            match self.refresh_one(&entry).await {
                Ok(count) => {
                    summary.refreshed += 1;
                    debug!(key = %entry.key, count, "cache entry refreshed");
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(key = %entry.key, "failed to refresh cache entry: {e}");
                }
            }

            if self.delay_seconds > 0 {
                tokio::time::sleep(std::time::Duration::from_secs(u64::from(
                    self.delay_seconds,
                )))
                .await;
            }
        }

        info!(
            refreshed = summary.refreshed,
            failed = summary.failed,
            "cache refresh sweep complete"
        );
        metrics::counter!("refresh_sweep_refreshed_total").increment(u64::from(summary.refreshed));
        metrics::counter!("refresh_sweep_failed_total").increment(u64::from(summary.failed));

        Ok(summary)
    }

    async fn refresh_one(&self, entry: &ExpiredSearch) -> Result<usize> {
        let keyword = refresh_keyword(&entry.key);

        let search = self
            .retry
            .run(|| self.dataforseo.search_maps(&keyword, entry.location_code))
            .await?;

        let records = listings_to_records(
            search.items,
            &entry.key.category,
            &entry.key.city,
            &entry.key.state,
        );

        self.store
            .cache_search_results(
                &entry.key,
                &records,
                entry.location_code,
                search.cost,
                self.cache_ttl_seconds,
            )
            .await?;

        Ok(records.len())
    }
}

/// Rebuild the provider keyword from a stored key, subcategory first when
/// present (mirrors the live search path).
fn refresh_keyword(key: &CacheKey) -> String {
    match key.subcategory.as_deref() {
        Some(sub) if !sub.is_empty() => {
            format!("{} {} in {}, {}", sub, key.category, key.city, key.state)
        }
        _ => format!("{} in {}, {}", key.category, key.city, key.state),
    }
}
