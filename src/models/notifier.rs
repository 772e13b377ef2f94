//! Notifier models for database operations.
//!
//! A generic [`NotifierRecord`] row is shared by every plugin; each plugin
//! owns a settings table keyed by the same id. In memory the payload is the
//! tagged [`NotifierSettings`] enum.

use std::fmt;

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{notifiers, telegram_settings};

// ============================================================================
// Base record
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = notifiers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotifierRecord {
    pub id: i32,
    pub plugin: String,
    pub is_enabled: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notifiers)]
pub struct NewNotifier<'a> {
    pub plugin: &'a str,
    pub is_enabled: bool,
}

// ============================================================================
// Telegram payload
// ============================================================================

/// Credentials used by the Telegram plugin. Both fields may be unset until
/// an operator fills in the settings form.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramSettings {
    pub chat_id: Option<i64>,
    pub access_token: Option<String>,
}

impl TelegramSettings {
    pub fn new(chat_id: i64, access_token: impl Into<String>) -> Self {
        Self {
            chat_id: Some(chat_id),
            access_token: Some(access_token.into()),
        }
    }

    /// Returns `(chat_id, access_token)` when both are usable for a send.
    ///
    /// A zero chat id or a blank token counts as missing.
    pub fn credentials(&self) -> Option<(i64, &str)> {
        let chat_id = self.chat_id.filter(|id| *id != 0)?;
        let token = self
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())?;
        Some((chat_id, token))
    }
}

// Keeps the bot token out of logs and panic messages
impl fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("chat_id", &self.chat_id)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = telegram_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TelegramSettingsRow {
    pub id: i32,
    pub chat_id: Option<i64>,
    pub access_token: Option<String>,
}

impl TelegramSettingsRow {
    pub fn from_settings(id: i32, settings: &TelegramSettings) -> Self {
        Self {
            id,
            chat_id: settings.chat_id,
            access_token: settings.access_token.clone(),
        }
    }
}

impl From<TelegramSettingsRow> for TelegramSettings {
    fn from(row: TelegramSettingsRow) -> Self {
        Self {
            chat_id: row.chat_id,
            access_token: row.access_token,
        }
    }
}

// ============================================================================
// Tagged payload
// ============================================================================

/// Identifies which payload variant a plugin reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsKind {
    Telegram,
}

impl SettingsKind {
    /// Settings table owned by a plugin name, if any.
    pub fn for_plugin(plugin: &str) -> Option<Self> {
        match plugin {
            "telegram" => Some(SettingsKind::Telegram),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsKind::Telegram => "telegram",
        }
    }
}

/// Provider-specific settings, tagged by plugin name on the wire:
/// `{"plugin": "telegram", "chat_id": 42, "access_token": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "plugin", rename_all = "snake_case")]
pub enum NotifierSettings {
    Telegram(TelegramSettings),
}

impl NotifierSettings {
    pub fn kind(&self) -> SettingsKind {
        match self {
            NotifierSettings::Telegram(_) => SettingsKind::Telegram,
        }
    }

    /// Unconfigured payload for a kind, used before anything was saved.
    pub fn empty(kind: SettingsKind) -> Self {
        match kind {
            SettingsKind::Telegram => NotifierSettings::Telegram(TelegramSettings::default()),
        }
    }

    pub fn as_telegram(&self) -> Option<&TelegramSettings> {
        match self {
            NotifierSettings::Telegram(settings) => Some(settings),
        }
    }
}
