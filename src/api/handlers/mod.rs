//! HTTP request handlers, grouped by resource.

pub mod health;
pub mod notifiers;
pub mod notify;
