//! Storage seam between notifier plugins and wherever settings live.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::NotifierSettings;

/// Async access to per-plugin settings and the enabled flag.
///
/// Plugins call [`SettingsStore::load`] on every send, so implementations
/// must not cache stale values.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Current settings for `plugin`, or `None` when nothing was saved yet.
    async fn load(&self, plugin: &str) -> AppResult<Option<NotifierSettings>>;

    /// Create or replace the settings for `plugin`.
    async fn save(&self, plugin: &str, settings: &NotifierSettings) -> AppResult<()>;

    async fn set_enabled(&self, plugin: &str, enabled: bool) -> AppResult<()>;

    /// Unknown plugins are reported as disabled.
    async fn is_enabled(&self, plugin: &str) -> AppResult<bool>;
}
