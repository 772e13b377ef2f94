//! `notify` command: one-shot delivery through every enabled notifier.

use crate::config::Settings;
use crate::db::establish_async_connection_pool;
use crate::error::AppResult;
use crate::services::notifications::{DeliveryReport, Notification, NotificationService};
use crate::state::AppState;

pub struct NotifyCommandHandler {
    config: Settings,
}

impl NotifyCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Fails when no enabled notifier delivered the message.
    pub async fn execute(&self, notification: Notification) -> AppResult<()> {
        let pool = establish_async_connection_pool(&self.config.database).await?;
        let state = AppState::new(pool, &self.config.telegram)?;
        send(&state.services.notifications, &notification).await
    }
}

async fn send(service: &NotificationService, notification: &Notification) -> AppResult<()> {
    let reports = service.notify_all(notification).await?;
    if reports.is_empty() {
        println!("No enabled notifiers; nothing was sent");
        return Ok(());
    }

    print_reports(&reports);
    if reports.iter().any(|r| r.delivered) {
        Ok(())
    } else {
        Err(anyhow::anyhow!("All {} notifier(s) failed", reports.len()).into())
    }
}

fn print_reports(reports: &[DeliveryReport]) {
    for report in reports {
        match &report.error {
            None => println!("✓ {}: delivered", report.plugin),
            Some(error) => println!("✗ {}: {}", report.plugin, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TelegramConfig;
    use crate::models::{NotifierSettings, TelegramSettings};
    use crate::repositories::InMemorySettingsStore;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service(status: u16, store: InMemorySettingsStore) -> (NotificationService, MockServer) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        let telegram = TelegramConfig {
            api_base_url: server.uri(),
            ..TelegramConfig::default()
        };
        let state = AppState::in_memory(store, &telegram).unwrap();
        (state.services.notifications, server)
    }

    fn configured() -> InMemorySettingsStore {
        InMemorySettingsStore::new().with_settings(
            "telegram",
            NotifierSettings::Telegram(TelegramSettings::new(42, "123:abc")),
        )
    }

    fn message() -> Notification {
        Notification {
            short_text: "Backup finished".to_string(),
            ..Notification::default()
        }
    }

    #[tokio::test]
    async fn test_delivered() {
        let (service, _server) = service(200, configured()).await;
        assert!(send(&service, &message()).await.is_ok());
    }

    #[tokio::test]
    async fn test_all_failed_is_error() {
        let (service, _server) = service(502, configured()).await;
        assert!(send(&service, &message()).await.is_err());
    }

    #[tokio::test]
    async fn test_nothing_enabled_is_ok() {
        let (service, server) = service(200, InMemorySettingsStore::new()).await;
        assert!(send(&service, &message()).await.is_ok());
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
