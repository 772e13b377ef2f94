//! Applies CLI overrides on top of file and environment configuration.
//!
//! Precedence, lowest first: config files, `NOTIFIER_*` variables, global
//! flags (`--verbose`/`--quiet`), subcommand flags.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Environment, Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
    environment: Environment,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings, environment: Environment) -> Self {
        Self {
            base_config,
            environment,
        }
    }

    /// Loads the unvalidated base configuration selected by `--config` and
    /// `--env`.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;
        if let Some(path) = &cli.config {
            loader = loader.with_config_file(path);
        }
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }

        let base_config = loader.load_unvalidated()?;
        Ok(Self::new(base_config, loader.environment()))
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Returns the validated settings with CLI overrides applied.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            ..
        }) = &cli.command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(level) = log_level {
                config.logger.level = level.as_str().to_string();
            }
        }

        config.validate()?;
        config.telegram.validate_for(self.environment)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn merger(environment: Environment) -> ConfigurationMerger {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/notifier".to_string();
        ConfigurationMerger::new(config, environment)
    }

    fn merge(args: &[&str]) -> Settings {
        let cli = Cli::try_parse_from(args).unwrap();
        merger(Environment::Development).merge_cli_args(&cli).unwrap()
    }

    #[test]
    fn test_global_log_flags() {
        assert_eq!(merge(&["notifier-rs", "--verbose"]).logger.level, "debug");
        assert_eq!(merge(&["notifier-rs", "--quiet"]).logger.level, "error");
    }

    #[test]
    fn test_serve_overrides() {
        let config = merge(&["notifier-rs", "serve", "--host", "0.0.0.0", "--port", "8080"]);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_command_log_level_wins_over_global() {
        let config = merge(&["notifier-rs", "--verbose", "serve", "--log-level", "warn"]);
        assert_eq!(config.logger.level, "warn");
    }

    #[test]
    fn test_notify_keeps_server_config() {
        let config = merge(&["notifier-rs", "notify", "--body", "hi"]);
        assert_eq!(config.server, Settings::default().server);
    }

    #[test]
    fn test_production_rejects_plain_http_api() {
        let mut merger = merger(Environment::Production);
        merger.base_config.telegram.api_base_url = "http://127.0.0.1:8081".to_string();

        let cli = Cli::try_parse_from(["notifier-rs", "serve"]).unwrap();
        assert!(matches!(
            merger.merge_cli_args(&cli),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_missing_database_url_fails_validation() {
        let merger = ConfigurationMerger::new(Settings::default(), Environment::Development);
        let cli = Cli::try_parse_from(["notifier-rs", "serve"]).unwrap();
        assert!(merger.merge_cli_args(&cli).is_err());
    }
}
