use std::time::Duration;

use crate::config::TelegramConfig;
use crate::error::{AppError, AppResult};

/// Builds the shared outbound HTTP client.
///
/// One client is created at startup and cloned into every plugin, so
/// connections to the bot API are pooled across sends.
///
/// - Timeouts come from the `[telegram]` section
/// - TLS via rustls, gzip responses accepted
/// - No cookie store; the bot API is stateless
pub fn build_http_client(config: &TelegramConfig) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .gzip(true)
        .user_agent(format!("notifier-rs/{}", crate::pkg_version()))
        .build()
        .map_err(|e| AppError::Configuration {
            key: "telegram".to_string(),
            source: anyhow::Error::from(e),
        })
}
