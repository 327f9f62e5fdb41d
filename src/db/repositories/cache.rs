use crate::entities::{prelude::*, vendor_cache};
use crate::models::query::CacheKey;
use crate::models::vendor::VendorRecord;
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

/// A cache row decoded for callers.
#[derive(Debug, Clone)]
pub struct CachedSearch {
    pub records: Vec<VendorRecord>,
    pub location_code: i32,
    pub cost: Option<f64>,
    pub created_at: String,
    pub expires_at: String,
}

/// An expired row as reported by a sweep. Carries the stored location code so
/// the refresh path does not need to resolve the location again.
#[derive(Debug, Clone)]
pub struct ExpiredSearch {
    pub key: CacheKey,
    pub location_code: i32,
}

pub struct CacheRepository {
    conn: DatabaseConnection,
}

impl CacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn by_key(key: &CacheKey) -> sea_orm::Select<VendorCache> {
        VendorCache::find()
            .filter(vendor_cache::Column::Category.eq(&key.category))
            .filter(vendor_cache::Column::City.eq(&key.city))
            .filter(vendor_cache::Column::State.eq(&key.state))
            .filter(vendor_cache::Column::SubcategoryKey.eq(key.subcategory_key()))
    }

    /// Fresh cache lookup. Expired rows are treated exactly like absent rows
    /// and are left in place for auditing and stale fallback.
    pub async fn get(&self, key: &CacheKey) -> Result<Option<CachedSearch>> {
        let now = chrono::Utc::now().to_rfc3339();

        let entry = Self::by_key(key)
            .filter(vendor_cache::Column::ExpiresAt.gt(&now))
            .one(&self.conn)
            .await?;

        entry.map(decode_row).transpose()
    }

    /// Most recent row for the key regardless of expiry. Only used when the
    /// provider is unavailable and stale data beats no data.
    pub async fn get_stale(&self, key: &CacheKey) -> Result<Option<CachedSearch>> {
        let entry = Self::by_key(key)
            .order_by_desc(vendor_cache::Column::ExpiresAt)
            .one(&self.conn)
            .await?;

        entry.map(decode_row).transpose()
    }

    /// Atomic upsert on (category, city, state, subcategory_key). Concurrent
    /// writers for the same key race harmlessly: last write wins and exactly
    /// one row remains. A unique violation surfacing here means key
    /// normalization diverged somewhere and is logged as a defect.
    pub async fn put(
        &self,
        key: &CacheKey,
        records: &[VendorRecord],
        location_code: i32,
        cost: Option<f64>,
        ttl_seconds: i64,
    ) -> Result<()> {
        let results_json = serde_json::to_string(records)?;
        let now = chrono::Utc::now();
        let created_at = now.to_rfc3339();
        let expires_at = (now + chrono::Duration::seconds(ttl_seconds)).to_rfc3339();

        let active_model = vendor_cache::ActiveModel {
            category: Set(key.category.clone()),
            city: Set(key.city.clone()),
            state: Set(key.state.clone()),
            subcategory: Set(key.subcategory.clone()),
            subcategory_key: Set(key.subcategory_key()),
            location_code: Set(location_code),
            results_json: Set(results_json),
            cost: Set(cost),
            created_at: Set(created_at),
            expires_at: Set(expires_at),
            ..Default::default()
        };

        let insert = VendorCache::insert(active_model).on_conflict(
            OnConflict::columns([
                vendor_cache::Column::Category,
                vendor_cache::Column::City,
                vendor_cache::Column::State,
                vendor_cache::Column::SubcategoryKey,
            ])
            .update_columns([
                vendor_cache::Column::Subcategory,
                vendor_cache::Column::LocationCode,
                vendor_cache::Column::ResultsJson,
                vendor_cache::Column::Cost,
                vendor_cache::Column::CreatedAt,
                vendor_cache::Column::ExpiresAt,
            ])
            .to_owned(),
        );

        match insert.exec(&self.conn).await {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("UNIQUE constraint") => {
                tracing::error!(
                    key = %key,
                    "cache write conflict despite upsert; key normalization is inconsistent"
                );
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Keys whose expiration has passed, as of now. The caller refreshes this
    /// snapshot; rows expiring mid-sweep wait for the next one.
    pub async fn sweep_expired(&self) -> Result<Vec<ExpiredSearch>> {
        let now = chrono::Utc::now().to_rfc3339();

        let rows = VendorCache::find()
            .filter(vendor_cache::Column::ExpiresAt.lt(&now))
            .order_by_asc(vendor_cache::Column::ExpiresAt)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ExpiredSearch {
                key: CacheKey {
                    category: row.category,
                    city: row.city,
                    state: row.state,
                    subcategory: row.subcategory,
                },
                location_code: row.location_code,
            })
            .collect())
    }

    pub async fn count(&self) -> Result<u64> {
        VendorCache::find()
            .count(&self.conn)
            .await
            .map_err(Into::into)
    }
}

fn decode_row(row: vendor_cache::Model) -> Result<CachedSearch> {
    let records: Vec<VendorRecord> = serde_json::from_str(&row.results_json)?;
    Ok(CachedSearch {
        records,
        location_code: row.location_code,
        cost: row.cost,
        created_at: row.created_at,
        expires_at: row.expires_at,
    })
}
