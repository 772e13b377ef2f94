//! Notifier management and delivery DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{NotifierSettings, SettingsKind, TelegramSettings};
use crate::services::notifications::{
    DeliveryReport, FormSchema, Notification, NotifierDescriptor, NotifierType,
};

#[derive(Debug, Serialize)]
pub struct NotifierResponse {
    pub name: String,
    #[serde(rename = "type")]
    pub notifier_type: NotifierType,
    pub enabled: bool,
    pub form: FormSchema,
}

impl From<NotifierDescriptor> for NotifierResponse {
    fn from(descriptor: NotifierDescriptor) -> Self {
        Self {
            name: descriptor.name.to_string(),
            notifier_type: descriptor.notifier_type,
            enabled: descriptor.enabled,
            form: descriptor.form,
        }
    }
}

/// Body of `PUT /api/notifiers/{name}`, mirroring the settings form.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    pub chat_id: Option<i64>,
    #[validate(length(max = 256, message = "Access token must be at most 256 characters"))]
    pub access_token: Option<String>,
}

impl UpdateSettingsRequest {
    pub fn into_settings(self, kind: SettingsKind) -> NotifierSettings {
        match kind {
            SettingsKind::Telegram => NotifierSettings::Telegram(TelegramSettings {
                chat_id: self.chat_id,
                access_token: self.access_token,
            }),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct TestNotificationResponse {
    pub name: String,
    pub delivered: bool,
}

/// Body of `POST /api/notify`.
#[derive(Debug, Deserialize, Validate)]
pub struct NotifyRequest {
    #[serde(default)]
    #[validate(length(max = 256, message = "Header must be at most 256 characters"))]
    pub header: String,
    #[validate(length(min = 1, message = "Short text must not be empty"))]
    pub short_text: String,
    pub full_text: Option<String>,
    #[validate(url(message = "URL must be a valid URL"))]
    pub url: Option<String>,
}

impl From<NotifyRequest> for Notification {
    fn from(request: NotifyRequest) -> Self {
        Self {
            header: request.header,
            short_text: request.short_text,
            full_text: request.full_text,
            url: request.url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotifyResponse {
    pub delivered: usize,
    pub failed: usize,
    pub results: Vec<DeliveryReport>,
}

impl From<Vec<DeliveryReport>> for NotifyResponse {
    fn from(results: Vec<DeliveryReport>) -> Self {
        let delivered = results.iter().filter(|r| r.delivered).count();
        Self {
            delivered,
            failed: results.len() - delivered,
            results,
        }
    }
}
