//! Shared application state.

use std::sync::Arc;

use voyage_cache::CacheManager;
use voyage_db::Database;

use crate::config::ApiConfig;
use crate::services::PromoService;

/// Handed to every handler through axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub cache: CacheManager,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, cache: CacheManager, config: ApiConfig) -> Self {
        AppState {
            db,
            cache,
            config: Arc::new(config),
        }
    }

    pub fn promos(&self) -> PromoService {
        PromoService::new(self.db.promos(), self.cache.clone())
    }
}
