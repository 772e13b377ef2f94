//! Contract between the host and individual notifier plugins.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{NotifierSettings, SettingsKind};

/// How much content a channel can render. The host passes the short or
/// the full text of an event accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifierType {
    ShortText,
    FullText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
}

/// One input of a settings form. `flex` is the share of the row width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub flex: u8,
}

impl FormField {
    pub const fn text(key: &'static str, label: &'static str, flex: u8) -> Self {
        Self {
            key,
            label,
            field_type: FieldType::Text,
            flex,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormRow {
    pub fields: Vec<FormField>,
}

/// Declarative settings form, rendered by the UI.
pub type FormSchema = Vec<FormRow>;

/// A notification channel the host can fan events out to.
///
/// Implementations re-read their settings on every [`notify`](Self::notify)
/// call and keep no mutable state between calls.
#[async_trait]
pub trait NotifierPlugin: Send + Sync {
    /// Unique plugin name, also the key its settings are stored under
    fn name(&self) -> &'static str;

    fn form(&self) -> FormSchema;

    fn notifier_type(&self) -> NotifierType;

    fn settings_kind(&self) -> SettingsKind;

    /// Deliver one message.
    ///
    /// Returns `Ok(true)` on success. Failures surface as
    /// `AppError::Notification` carrying the failure code.
    async fn notify(&self, header: &str, body: &str, url: Option<&str>) -> AppResult<bool>;

    /// Check settings before they are saved. The default only checks that
    /// the payload belongs to this plugin.
    fn validate_settings(&self, settings: &NotifierSettings) -> AppResult<()> {
        if settings.kind() != self.settings_kind() {
            return Err(AppError::Validation {
                field: "plugin".to_string(),
                reason: format!(
                    "Expected {} settings, got {}",
                    self.settings_kind().as_str(),
                    settings.kind().as_str()
                ),
            });
        }
        Ok(())
    }
}
