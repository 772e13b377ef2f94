//! Notifier plugins and the host-side manager that drives them.
//!
//! Every channel implements [`NotifierPlugin`]; plugins are registered
//! explicitly into a [`PluginRegistry`] at startup and reached through
//! [`NotificationService`].

mod plugin;
mod registry;
mod telegram;

pub mod notification_service;

pub use notification_service::{
    DeliveryReport, Notification, NotificationService, NotifierDescriptor,
};
pub use plugin::{FieldType, FormField, FormRow, FormSchema, NotifierPlugin, NotifierType};
pub use registry::{PluginRegistry, PluginRegistryBuilder};
pub use telegram::TelegramNotifier;
