//! Outbound HTTP plumbing shared by notifier plugins.

pub mod client;

pub use client::build_http_client;
