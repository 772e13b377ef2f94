//! Application state for Axum web framework.

use std::sync::Arc;

use crate::config::TelegramConfig;
use crate::db::AsyncDbPool;
use crate::error::AppResult;
use crate::external::build_http_client;
use crate::repositories::{InMemorySettingsStore, NotifierRepository, SettingsStore};
use crate::services::Services;

/// Shared services and resources handed to every handler.
///
/// Cloning is cheap since both `Services` and `AsyncDbPool` use `Arc`
/// internally.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Present when settings are persisted in PostgreSQL
    pub db_pool: Option<AsyncDbPool>,
}

impl AppState {
    /// Settings persisted through the database pool.
    pub fn new(pool: AsyncDbPool, telegram: &TelegramConfig) -> AppResult<Self> {
        let store: Arc<dyn SettingsStore> = Arc::new(NotifierRepository::new(pool.clone()));
        let services = Services::new(store, build_http_client(telegram)?, telegram)?;
        Ok(Self {
            services,
            db_pool: Some(pool),
        })
    }

    /// Settings kept in process memory only.
    pub fn in_memory(store: InMemorySettingsStore, telegram: &TelegramConfig) -> AppResult<Self> {
        let services = Services::new(Arc::new(store), build_http_client(telegram)?, telegram)?;
        Ok(Self {
            services,
            db_pool: None,
        })
    }
}
