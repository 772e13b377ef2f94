//! Typed failures raised by notifier plugins.

use thiserror::Error;

/// Category of a notification failure.
///
/// The numeric codes are part of the host contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationErrorKind {
    /// Settings absent, or a required credential is empty
    MissingCredentials,
    /// The remote API answered with a non-200 status or could not be reached
    DeliveryFailed,
}

impl NotificationErrorKind {
    pub const fn code(&self) -> u16 {
        match self {
            NotificationErrorKind::MissingCredentials => 1,
            NotificationErrorKind::DeliveryFailed => 2,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            NotificationErrorKind::MissingCredentials => "MISSING_CREDENTIALS",
            NotificationErrorKind::DeliveryFailed => "DELIVERY_FAILED",
        }
    }
}

/// Failure reported by a notifier plugin, carrying a code and a message.
#[derive(Debug, Error)]
#[error("{message} (code {})", .kind.code())]
pub struct NotificationError {
    kind: NotificationErrorKind,
    message: String,
    /// HTTP status returned by the remote API, when one was received
    status: Option<u16>,
    #[source]
    source: Option<reqwest::Error>,
}

impl NotificationError {
    pub fn missing_credentials() -> Self {
        Self {
            kind: NotificationErrorKind::MissingCredentials,
            message: "Access Token or User Id was not specified".to_string(),
            status: None,
            source: None,
        }
    }

    /// Remote API answered, but not with 200
    pub fn rejected(plugin: &str, status: u16) -> Self {
        Self {
            kind: NotificationErrorKind::DeliveryFailed,
            message: format!("Failed to send {plugin} notification"),
            status: Some(status),
            source: None,
        }
    }

    /// Request never produced a response (connect, DNS, timeout)
    pub fn transport(plugin: &str, source: reqwest::Error) -> Self {
        Self {
            kind: NotificationErrorKind::DeliveryFailed,
            message: format!("Failed to send {plugin} notification"),
            status: None,
            source: Some(source),
        }
    }

    pub fn kind(&self) -> NotificationErrorKind {
        self.kind
    }

    pub fn code(&self) -> u16 {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }
}
