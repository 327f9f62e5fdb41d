use crate::entities::{provider_locations, social_vendors, vendors};
use crate::models::query::CacheKey;
use crate::models::vendor::VendorRecord;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::cache::{CachedSearch, ExpiredSearch};
pub use repositories::vendor::approved_listing;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn cache_repo(&self) -> repositories::cache::CacheRepository {
        repositories::cache::CacheRepository::new(self.conn.clone())
    }

    fn vendor_repo(&self) -> repositories::vendor::VendorRepository {
        repositories::vendor::VendorRepository::new(self.conn.clone())
    }

    fn social_repo(&self) -> repositories::social::SocialVendorRepository {
        repositories::social::SocialVendorRepository::new(self.conn.clone())
    }

    fn location_repo(&self) -> repositories::location::LocationRepository {
        repositories::location::LocationRepository::new(self.conn.clone())
    }

    // ========== Search cache ==========

    pub async fn get_cached_search(&self, key: &CacheKey) -> Result<Option<CachedSearch>> {
        self.cache_repo().get(key).await
    }

    pub async fn get_stale_search(&self, key: &CacheKey) -> Result<Option<CachedSearch>> {
        self.cache_repo().get_stale(key).await
    }

    pub async fn cache_search_results(
        &self,
        key: &CacheKey,
        records: &[VendorRecord],
        location_code: i32,
        cost: Option<f64>,
        ttl_seconds: i64,
    ) -> Result<()> {
        self.cache_repo()
            .put(key, records, location_code, cost, ttl_seconds)
            .await
    }

    pub async fn sweep_expired_searches(&self) -> Result<Vec<ExpiredSearch>> {
        self.cache_repo().sweep_expired().await
    }

    pub async fn cached_search_count(&self) -> Result<u64> {
        self.cache_repo().count().await
    }

    // ========== Local vendors ==========

    pub async fn search_vendors(
        &self,
        category: &str,
        subcategory: Option<&str>,
        city: &str,
        state: &str,
        limit: u64,
    ) -> Result<Vec<vendors::Model>> {
        self.vendor_repo()
            .search(category, subcategory, city, state, limit)
            .await
    }

    pub async fn list_vendors(
        &self,
        category: Option<&str>,
        city: Option<&str>,
        state: Option<&str>,
        limit: u64,
    ) -> Result<Vec<vendors::Model>> {
        self.vendor_repo().list(category, city, state, limit).await
    }

    pub async fn add_vendor(&self, vendor: vendors::ActiveModel) -> Result<i32> {
        self.vendor_repo().add(vendor).await
    }

    pub async fn vendor_count(&self) -> Result<u64> {
        self.vendor_repo().count().await
    }

    // ========== Social vendors ==========

    pub async fn search_social_vendors(
        &self,
        category: &str,
        subcategory: Option<&str>,
        city: &str,
        state: &str,
        limit: u64,
    ) -> Result<Vec<social_vendors::Model>> {
        self.social_repo()
            .search(category, subcategory, city, state, limit)
            .await
    }

    pub async fn upsert_social_vendor(&self, profile: social_vendors::ActiveModel) -> Result<bool> {
        self.social_repo().upsert(profile).await
    }

    pub async fn social_vendor_count(&self) -> Result<u64> {
        self.social_repo().count().await
    }

    // ========== Provider locations ==========

    pub async fn find_city_location(
        &self,
        city: &str,
        state: &str,
    ) -> Result<Option<provider_locations::Model>> {
        self.location_repo().find_city(city, state).await
    }

    pub async fn find_state_location(
        &self,
        state: &str,
    ) -> Result<Option<provider_locations::Model>> {
        self.location_repo().find_state(state).await
    }

    pub async fn list_states(&self) -> Result<Vec<provider_locations::Model>> {
        self.location_repo().list_states().await
    }

    pub async fn list_cities_for_state(
        &self,
        state: &str,
    ) -> Result<Vec<provider_locations::Model>> {
        self.location_repo().list_cities(state).await
    }

    pub async fn replace_locations(
        &self,
        locations: Vec<provider_locations::ActiveModel>,
    ) -> Result<usize> {
        self.location_repo().replace_all(locations).await
    }

    pub async fn oldest_location_update(&self) -> Result<Option<String>> {
        self.location_repo().oldest_update().await
    }

    pub async fn location_count(&self) -> Result<u64> {
        self.location_repo().count().await
    }
}
