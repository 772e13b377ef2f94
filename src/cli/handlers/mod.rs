//! Subcommand handlers.

mod migrate;
mod notify;
mod serve;

pub use migrate::MigrateCommandHandler;
pub use notify::NotifyCommandHandler;
pub use serve::ServeCommandHandler;
