//! Notification service for business logic.
//!
//! Manages plugin settings and fans host events out to enabled plugins.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use super::plugin::{FormSchema, NotifierType};
use super::registry::PluginRegistry;
use crate::error::{AppError, AppResult};
use crate::models::NotifierSettings;
use crate::repositories::SettingsStore;

const TEST_HEADER: &str = "Test notification";
const TEST_BODY: &str = "This is a test notification from notifier-rs.";

/// What the host knows about a registered plugin.
#[derive(Debug, Clone, Serialize)]
pub struct NotifierDescriptor {
    pub name: &'static str,
    pub notifier_type: NotifierType,
    pub form: FormSchema,
    pub enabled: bool,
}

/// An event to deliver. Short-text channels get `short_text`; full-text
/// channels get `full_text`, falling back to `short_text`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub header: String,
    pub short_text: String,
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Notification {
    pub fn text_for(&self, notifier_type: NotifierType) -> &str {
        match notifier_type {
            NotifierType::ShortText => &self.short_text,
            NotifierType::FullText => self.full_text.as_deref().unwrap_or(&self.short_text),
        }
    }
}

/// Outcome of one plugin's delivery attempt.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub plugin: &'static str,
    pub delivered: bool,
    /// Failure code, when the failure was a notification error
    pub code: Option<u16>,
    pub error: Option<String>,
}

impl DeliveryReport {
    fn from_result(plugin: &'static str, result: AppResult<bool>) -> Self {
        match result {
            Ok(delivered) => Self {
                plugin,
                delivered,
                code: None,
                error: None,
            },
            Err(err) => Self {
                plugin,
                delivered: false,
                code: match &err {
                    AppError::Notification(e) => Some(e.code()),
                    _ => None,
                },
                error: Some(err.to_string()),
            },
        }
    }
}

/// Host-side manager for notifier plugins
#[derive(Clone)]
pub struct NotificationService {
    registry: Arc<PluginRegistry>,
    store: Arc<dyn SettingsStore>,
}

impl NotificationService {
    pub fn new(registry: Arc<PluginRegistry>, store: Arc<dyn SettingsStore>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    // ========================================================================
    // Settings management
    // ========================================================================

    pub async fn list(&self) -> AppResult<Vec<NotifierDescriptor>> {
        let mut descriptors = Vec::with_capacity(self.registry.len());
        for plugin in self.registry.iter() {
            descriptors.push(NotifierDescriptor {
                name: plugin.name(),
                notifier_type: plugin.notifier_type(),
                form: plugin.form(),
                enabled: self.store.is_enabled(plugin.name()).await?,
            });
        }
        Ok(descriptors)
    }

    /// Current settings, or an empty payload when none were saved.
    pub async fn get_settings(&self, name: &str) -> AppResult<NotifierSettings> {
        let plugin = self.registry.require(name)?;
        Ok(self
            .store
            .load(name)
            .await?
            .unwrap_or_else(|| NotifierSettings::empty(plugin.settings_kind())))
    }

    pub async fn update_settings(
        &self,
        name: &str,
        settings: NotifierSettings,
    ) -> AppResult<NotifierSettings> {
        let plugin = self.registry.require(name)?;
        plugin.validate_settings(&settings)?;
        self.store.save(name, &settings).await?;

        tracing::info!(plugin = name, "Notifier settings updated");
        Ok(settings)
    }

    pub async fn set_enabled(&self, name: &str, enabled: bool) -> AppResult<()> {
        self.registry.require(name)?;
        self.store.set_enabled(name, enabled).await?;

        tracing::info!(plugin = name, enabled, "Notifier toggled");
        Ok(())
    }

    // ========================================================================
    // Sending
    // ========================================================================

    /// Sends a fixed test message through one plugin, enabled or not.
    pub async fn send_test(&self, name: &str) -> AppResult<bool> {
        let plugin = self.registry.require(name)?;
        plugin.notify(TEST_HEADER, TEST_BODY, None).await
    }

    /// Delivers `notification` to every enabled plugin concurrently.
    ///
    /// A failing plugin never prevents delivery through the others; every
    /// outcome is reported in registration order.
    pub async fn notify_all(&self, notification: &Notification) -> AppResult<Vec<DeliveryReport>> {
        let mut enabled = Vec::new();
        for plugin in self.registry.iter() {
            if self.store.is_enabled(plugin.name()).await? {
                enabled.push(plugin.clone());
            }
        }

        if enabled.is_empty() {
            tracing::debug!("No enabled notifiers, nothing to send");
            return Ok(Vec::new());
        }

        let sends = enabled.iter().map(|plugin| async move {
            let text = notification.text_for(plugin.notifier_type());
            let result = plugin
                .notify(&notification.header, text, notification.url.as_deref())
                .await;
            if let Err(ref e) = result {
                tracing::warn!(plugin = plugin.name(), error = %e, "Notifier failed");
            }
            DeliveryReport::from_result(plugin.name(), result)
        });

        Ok(join_all(sends).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotificationError;
    use crate::models::{SettingsKind, TelegramSettings};
    use crate::repositories::InMemorySettingsStore;
    use crate::services::notifications::plugin::NotifierPlugin;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every call; fails when `fail` is set.
    struct Recording {
        name: &'static str,
        notifier_type: NotifierType,
        fail: bool,
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl NotifierPlugin for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn form(&self) -> FormSchema {
            Vec::new()
        }

        fn notifier_type(&self) -> NotifierType {
            self.notifier_type
        }

        fn settings_kind(&self) -> SettingsKind {
            SettingsKind::Telegram
        }

        async fn notify(&self, _: &str, body: &str, _: Option<&str>) -> AppResult<bool> {
            self.calls.lock().unwrap().push(body.to_string());
            if self.fail {
                return Err(NotificationError::rejected(self.name, 500).into());
            }
            Ok(true)
        }
    }

    fn recording(
        name: &'static str,
        notifier_type: NotifierType,
        fail: bool,
    ) -> (Recording, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Recording {
                name,
                notifier_type,
                fail,
                calls: calls.clone(),
            },
            calls,
        )
    }

    fn service(registry: PluginRegistry, store: InMemorySettingsStore) -> NotificationService {
        NotificationService::new(Arc::new(registry), Arc::new(store))
    }

    fn event() -> Notification {
        Notification {
            header: "Finished".to_string(),
            short_text: "short".to_string(),
            full_text: Some("full".to_string()),
            url: None,
        }
    }

    #[test]
    fn test_text_for_falls_back_to_short() {
        let mut notification = event();
        assert_eq!(notification.text_for(NotifierType::ShortText), "short");
        assert_eq!(notification.text_for(NotifierType::FullText), "full");
        notification.full_text = None;
        assert_eq!(notification.text_for(NotifierType::FullText), "short");
    }

    #[tokio::test]
    async fn test_notify_all_skips_disabled_and_picks_text() {
        let (short, short_calls) = recording("short", NotifierType::ShortText, false);
        let (full, full_calls) = recording("full", NotifierType::FullText, false);
        let (off, off_calls) = recording("off", NotifierType::ShortText, false);
        let registry = PluginRegistry::builder()
            .register(short)
            .register(full)
            .register(off)
            .build()
            .unwrap();

        let store = InMemorySettingsStore::new();
        store.set_enabled("short", true).await.unwrap();
        store.set_enabled("full", true).await.unwrap();

        let reports = service(registry, store).notify_all(&event()).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.delivered));
        assert_eq!(*short_calls.lock().unwrap(), vec!["short"]);
        assert_eq!(*full_calls.lock().unwrap(), vec!["full"]);
        assert!(off_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notify_all_failure_does_not_abort_others() {
        let (bad, _) = recording("bad", NotifierType::ShortText, true);
        let (good, good_calls) = recording("good", NotifierType::ShortText, false);
        let registry = PluginRegistry::builder()
            .register(bad)
            .register(good)
            .build()
            .unwrap();

        let store = InMemorySettingsStore::new();
        store.set_enabled("bad", true).await.unwrap();
        store.set_enabled("good", true).await.unwrap();

        let reports = service(registry, store).notify_all(&event()).await.unwrap();

        assert_eq!(reports[0].plugin, "bad");
        assert!(!reports[0].delivered);
        assert_eq!(reports[0].code, Some(2));
        assert_eq!(reports[1].plugin, "good");
        assert!(reports[1].delivered);
        assert_eq!(good_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_settings_defaults_to_empty() {
        let (plugin, _) = recording("telegram", NotifierType::ShortText, false);
        let registry = PluginRegistry::builder().register(plugin).build().unwrap();
        let service = service(registry, InMemorySettingsStore::new());

        let settings = service.get_settings("telegram").await.unwrap();
        assert_eq!(
            settings,
            NotifierSettings::Telegram(TelegramSettings::default())
        );
        assert!(matches!(
            service.get_settings("missing").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_then_list_reflects_state() {
        let (plugin, _) = recording("telegram", NotifierType::ShortText, false);
        let registry = PluginRegistry::builder().register(plugin).build().unwrap();
        let service = service(registry, InMemorySettingsStore::new());

        let settings = NotifierSettings::Telegram(TelegramSettings::new(7, "7:x"));
        service
            .update_settings("telegram", settings.clone())
            .await
            .unwrap();
        service.set_enabled("telegram", true).await.unwrap();

        assert_eq!(service.get_settings("telegram").await.unwrap(), settings);
        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].enabled);
    }

    #[tokio::test]
    async fn test_send_test_ignores_enabled_flag() {
        let (plugin, calls) = recording("telegram", NotifierType::ShortText, false);
        let registry = PluginRegistry::builder().register(plugin).build().unwrap();
        let service = service(registry, InMemorySettingsStore::new());

        assert!(service.send_test("telegram").await.unwrap());
        assert_eq!(*calls.lock().unwrap(), vec![TEST_BODY]);
    }
}
