mod app_error;
mod database_converter;
mod notification_error;

pub use app_error::{AppError, AppResult};
pub use database_converter::DatabaseErrorConverter;
pub use notification_error::{NotificationError, NotificationErrorKind};
