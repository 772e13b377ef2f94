//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! plugins, repositories and handlers.

pub mod notifications;

pub use notifications::NotificationService;

use std::sync::Arc;

use crate::config::TelegramConfig;
use crate::error::AppResult;
use crate::repositories::SettingsStore;
use notifications::{PluginRegistry, TelegramNotifier};

/// Aggregates all services for convenient access.
///
/// This struct is designed to be used as Axum application state.
/// Cloning is cheap since everything inside is behind `Arc`.
#[derive(Clone)]
pub struct Services {
    pub notifications: NotificationService,
}

impl Services {
    /// Registers the built-in plugins against `store` and wires the services.
    pub fn new(
        store: Arc<dyn SettingsStore>,
        client: reqwest::Client,
        telegram: &TelegramConfig,
    ) -> AppResult<Self> {
        let registry = PluginRegistry::builder()
            .register(TelegramNotifier::new(client, store.clone(), telegram))
            .build()?;

        Ok(Self {
            notifications: NotificationService::new(Arc::new(registry), store),
        })
    }
}
