use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::dataforseo::DataForSeoConfig;
use crate::clients::instagram::InstagramConfig;
use crate::clients::{DataForSeoClient, InstagramClient, RetryPolicy, build_shared_http_client};
use crate::config::Config;
use crate::db::Store;
use crate::services::{IngestService, LocationService, RefreshService, SearchService};

/// Everything the API, CLI and scheduler share. All handles are injected
/// here once; nothing reaches for module-level singletons.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub dataforseo: Arc<DataForSeoClient>,

    pub instagram: Arc<InstagramClient>,

    pub locations: Arc<LocationService>,

    pub search_service: Arc<SearchService>,

    pub refresh_service: Arc<RefreshService>,

    pub ingest_service: Arc<IngestService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        // One pooled HTTP client for every provider call.
        let http_client =
            build_shared_http_client(config.dataforseo.request_timeout_seconds.into())?;

        let dataforseo = Arc::new(DataForSeoClient::with_shared_client(
            http_client.clone(),
            DataForSeoConfig {
                base_url: config.dataforseo.base_url.clone(),
                login: if config.dataforseo.enabled {
                    config.dataforseo.login.clone()
                } else {
                    String::new()
                },
                password: config.dataforseo.password.clone(),
                language_code: config.dataforseo.language_code.clone(),
                depth: config.dataforseo.depth,
            },
        ));

        let instagram = Arc::new(InstagramClient::with_shared_client(
            http_client,
            InstagramConfig {
                base_url: config.instagram.base_url.clone(),
                api_key: if config.instagram.enabled {
                    config.instagram.api_key.clone()
                } else {
                    String::new()
                },
            },
        ));

        let retry = RetryPolicy {
            max_attempts: config.retry.max_attempts.max(1),
            base_delay_ms: config.retry.base_delay_ms,
        };

        let locations = Arc::new(LocationService::new(
            store.clone(),
            dataforseo.clone(),
            retry,
        ));

        let search_service = Arc::new(SearchService::new(
            store.clone(),
            dataforseo.clone(),
            locations.clone(),
            retry,
            config.cache.ttl_seconds(),
        ));

        let refresh_service = Arc::new(RefreshService::new(
            store.clone(),
            dataforseo.clone(),
            retry,
            config.cache.ttl_seconds(),
            config.scheduler.refresh_delay_seconds,
        ));

        let ingest_service = Arc::new(IngestService::new(store.clone(), instagram.clone(), retry));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            dataforseo,
            instagram,
            locations,
            search_service,
            refresh_service,
            ingest_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
