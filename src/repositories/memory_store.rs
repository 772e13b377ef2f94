//! In-process settings store used by tests and by runs without a database.

use async_trait::async_trait;
use dashmap::DashMap;

use super::SettingsStore;
use crate::error::AppResult;
use crate::models::NotifierSettings;

#[derive(Debug, Clone, Default)]
struct Entry {
    settings: Option<NotifierSettings>,
    is_enabled: bool,
}

#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    entries: DashMap<String, Entry>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a plugin with settings and enable it.
    pub fn with_settings(self, plugin: &str, settings: NotifierSettings) -> Self {
        self.entries.insert(
            plugin.to_string(),
            Entry {
                settings: Some(settings),
                is_enabled: true,
            },
        );
        self
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self, plugin: &str) -> AppResult<Option<NotifierSettings>> {
        Ok(self
            .entries
            .get(plugin)
            .and_then(|entry| entry.settings.clone()))
    }

    async fn save(&self, plugin: &str, settings: &NotifierSettings) -> AppResult<()> {
        self.entries.entry(plugin.to_string()).or_default().settings = Some(settings.clone());
        Ok(())
    }

    async fn set_enabled(&self, plugin: &str, enabled: bool) -> AppResult<()> {
        self.entries.entry(plugin.to_string()).or_default().is_enabled = enabled;
        Ok(())
    }

    async fn is_enabled(&self, plugin: &str) -> AppResult<bool> {
        Ok(self
            .entries
            .get(plugin)
            .map(|entry| entry.is_enabled)
            .unwrap_or(false))
    }
}
