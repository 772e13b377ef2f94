//! Command-line entry point: parsing, configuration merging and dispatch.

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel};

use crate::config::Settings;
use crate::logger::init_logger;

/// Loads configuration, installs the logger and runs the command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let merger = ConfigurationMerger::from_cli(&cli)?;
    let settings = merger.merge_cli_args(&cli)?;
    init_logger_from_settings(&settings)?;

    execute_command(cli, settings, merger.environment()).await
}

pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let logger_config = settings.logger.clone().into_logger_config()?;
    init_logger(logger_config)
}
