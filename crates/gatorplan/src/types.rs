use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::catalog_info::{CatalogClient, CatalogClientConfig, CatalogInfoError};
use crate::config::AppConfig;
use crate::db::StudentDb;
use crate::requirements::RecommendationSelector;

/// State shared by every request handler.
pub struct AppState {
    pub selector: RecommendationSelector,
    pub catalog_client: CatalogClient,
    pub student_db: StudentDb,
    pub config: AppConfig,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        selector: RecommendationSelector,
        catalog_client: CatalogClient,
        student_db: StudentDb,
        config: AppConfig,
    ) -> Self {
        Self {
            selector,
            catalog_client,
            student_db,
            config,
            started_at: Utc::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        (Utc::now() - self.started_at).to_std().unwrap_or_default()
    }
}

/// Catalog client settings derived from the app config.
pub fn catalog_client_config(config: &AppConfig) -> CatalogClientConfig {
    CatalogClientConfig {
        cache_ttl: config.cache_ttl(),
        ..CatalogClientConfig::default()
    }
}

/// Builds the HTTP-backed catalog client for `config`.
pub fn build_catalog_client(config: &AppConfig) -> Result<CatalogClient, CatalogInfoError> {
    CatalogClient::new(catalog_client_config(config))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::catalog_info::PageFetcher;
    use crate::requirements::load_selector;
    use futures::future::{self, BoxFuture};
    use futures::FutureExt;
    use std::sync::Arc;

    /// Answers every request with a 404, so lookups degrade to placeholders
    /// without tripping the circuit breaker.
    pub struct OfflineFetcher;

    impl PageFetcher for OfflineFetcher {
        fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, CatalogInfoError>> {
            future::ready(Err(CatalogInfoError::Status {
                status: 404,
                url: url.to_string(),
            }))
            .boxed()
        }
    }

    pub fn test_state() -> Arc<AppState> {
        let config = AppConfig::default();
        let client =
            CatalogClient::with_fetcher(catalog_client_config(&config), Arc::new(OfflineFetcher));

        Arc::new(AppState::new(
            load_selector(None).unwrap(),
            client,
            StudentDb::open_in_memory().unwrap(),
            config,
        ))
    }
}
