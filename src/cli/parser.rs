//! Command-line interface definition.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use super::validation::{
    validate_config_file_path, validate_host_address, validate_link_url, validate_message_text,
    validate_port, validate_rollback_steps,
};
use crate::build;

/// Telegram notifier service
#[derive(Parser, Debug)]
#[command(name = "notifier-rs")]
#[command(about = "Delivers host notifications through configurable notifier plugins")]
#[command(long_about = "
notifier-rs stores per-plugin notifier settings, exposes them over an HTTP
API and delivers host events to every enabled notifier (currently Telegram).

EXAMPLES:
    # Start the server with the layered configuration in ./config
    notifier-rs serve

    # Bind to all interfaces on port 8080
    notifier-rs serve --host 0.0.0.0 --port 8080

    # Validate configuration without starting
    notifier-rs --env production serve --dry-run

    # Apply pending migrations
    notifier-rs migrate

    # Send a message to every enabled notifier
    notifier-rs notify --body 'Backup <b>finished</b>' --url https://ci.example.com/run/42
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Single configuration file used instead of the layered `config/` directory
    #[arg(short, long, value_name = "FILE", value_parser = validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override NOTIFIER_APP_ENV
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Error-level logging only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = validate_host_address)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, value_name = "PORT", value_parser = validate_port)]
        port: Option<u16>,

        /// Log level for this run; wins over --verbose/--quiet
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Apply or roll back database migrations
    Migrate {
        /// List pending migrations without applying them
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Revert the N most recent migrations (1-100)
        #[arg(long, value_name = "STEPS", value_parser = validate_rollback_steps)]
        rollback: Option<u32>,
    },
    /// Send one message to every enabled notifier using stored settings
    Notify {
        /// Message text; bare tags like <b> are stripped, tags with attributes are kept
        #[arg(long, value_parser = validate_message_text)]
        body: String,

        /// Event title, passed to plugins that render one
        #[arg(long, default_value = "")]
        header: String,

        /// Longer text for full-text notifiers
        #[arg(long)]
        full_text: Option<String>,

        /// Link associated with the event
        #[arg(long, value_parser = validate_link_url)]
        url: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}
