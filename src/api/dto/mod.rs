//! Data Transfer Objects for API requests and responses.

mod error;
mod health;
mod notifier;

pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use notifier::{
    NotifierResponse, NotifyRequest, NotifyResponse, SetEnabledRequest, TestNotificationResponse,
    UpdateSettingsRequest,
};
