//! Configuration loader for notifier-rs
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "NOTIFIER_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "NOTIFIER_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "NOTIFIER";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// Sources, lowest priority first:
/// 1. `default.toml` (required)
/// 2. `{environment}.toml` (optional)
/// 3. `local.toml` (optional)
/// 4. `NOTIFIER_*` environment variables
///
/// An explicit file (`NOTIFIER_CONFIG_FILE` or `--config`) replaces steps 1-3.
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a new configuration loader from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if both `NOTIFIER_CONFIG_DIR` and `NOTIFIER_CONFIG_FILE`
    /// are set, as they are mutually exclusive.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));

        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && std::env::var(CONFIG_DIR_ENV).is_ok() {
            return Err(ConfigError::MutualExclusivityError(
                "NOTIFIER_CONFIG_DIR and NOTIFIER_CONFIG_FILE cannot both be set. \
                 Use NOTIFIER_CONFIG_DIR for layered configuration or \
                 NOTIFIER_CONFIG_FILE for a single configuration file."
                    .to_string(),
            ));
        }

        Ok(Self {
            config_dir,
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Use a single configuration file instead of the layered directory
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Override the environment detected from `NOTIFIER_APP_ENV`
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Load and validate configuration from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if `default.toml` (or the explicit file) is missing,
    /// if parsing fails, or if validation fails.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings = self.load_unvalidated()?;
        settings.validate()?;
        settings.telegram.validate_for(self.environment)?;
        Ok(settings)
    }

    /// Load configuration without validation, for callers that apply CLI
    /// overrides before validating
    pub fn load_unvalidated(&self) -> Result<Settings, ConfigError> {
        self.build_config()?.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match self.config_file {
            Some(ref file) => Self::add_file_source(builder, file, true)?,
            None => self.build_layered_config(builder)?,
        };

        // NOTIFIER_TELEGRAM__API_BASE_URL -> telegram.api_base_url
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        );

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let builder = Self::add_file_source(builder, &self.config_dir.join("default.toml"), true)?;

        let env_path = self
            .config_dir
            .join(format!("{}.toml", self.environment.as_str()));
        let builder = Self::add_file_source(builder, &env_path, false)?;

        Self::add_file_source(builder, &self.config_dir.join("local.toml"), false)
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        let name = path.to_str().ok_or_else(|| {
            ConfigError::ParseError(format!("Non UTF-8 configuration path: {}", path.display()))
        })?;

        Ok(builder.add_source(File::new(name, FileFormat::Toml).required(required)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Environment variables are process-global
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    const BASE: &str = r#"
[database]
url = "postgres://localhost/notifier"

[telegram]
api_base_url = "https://api.telegram.org"
"#;

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("Failed to write config file");
        }
        temp_dir
    }

    struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self {
                vars_to_restore: Vec::new(),
            }
        }

        fn set(&mut self, key: &str, value: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        fn remove(&mut self, key: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original_value) in self.vars_to_restore.iter().rev() {
                unsafe {
                    match original_value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    fn clean_env() -> EnvGuard {
        let mut env = EnvGuard::new();
        env.remove(CONFIG_DIR_ENV);
        env.remove(CONFIG_FILE_ENV);
        env.remove(AppEnvironment::ENV_VAR);
        env.remove("NOTIFIER_SERVER__PORT");
        env.remove("NOTIFIER_TELEGRAM__API_BASE_URL");
        env
    }

    #[test]
    fn test_mutual_exclusivity_error() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = clean_env();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(CONFIG_FILE_ENV, "/path/to/config.toml");

        let result = ConfigLoader::new();
        assert!(matches!(result, Err(ConfigError::MutualExclusivityError(_))));
    }

    #[test]
    fn test_load_missing_default_toml() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = clean_env();
        let dir = setup_config_dir(&[]);
        env.set(CONFIG_DIR_ENV, dir.path().to_str().unwrap());

        let result = ConfigLoader::new().unwrap().load();
        match result {
            Err(ConfigError::FileNotFound(msg)) => assert!(msg.contains("default.toml")),
            other => panic!("Expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_environment_file_overrides_default() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = clean_env();
        let dir = setup_config_dir(&[
            ("default.toml", BASE),
            ("test.toml", "[telegram]\nrequest_timeout = 5\nconnect_timeout = 2\n"),
        ]);
        env.set(CONFIG_DIR_ENV, dir.path().to_str().unwrap());
        env.set(AppEnvironment::ENV_VAR, "test");

        let settings = ConfigLoader::new().unwrap().load().unwrap();
        assert_eq!(settings.telegram.request_timeout, 5);
        assert_eq!(settings.telegram.connect_timeout, 2);
        assert_eq!(settings.telegram.api_base_url, "https://api.telegram.org");
    }

    #[test]
    fn test_env_var_has_highest_priority() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = clean_env();
        let dir = setup_config_dir(&[
            ("default.toml", BASE),
            ("local.toml", "[server]\nport = 7000\n"),
        ]);
        env.set(CONFIG_DIR_ENV, dir.path().to_str().unwrap());
        env.set("NOTIFIER_SERVER__PORT", "7100");

        let settings = ConfigLoader::new().unwrap().load().unwrap();
        assert_eq!(settings.server.port, 7100);
    }

    #[test]
    fn test_single_file_mode() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let _env = clean_env();
        let dir = setup_config_dir(&[("only.toml", BASE)]);

        let settings = ConfigLoader::new()
            .unwrap()
            .with_config_file(dir.path().join("only.toml"))
            .load()
            .unwrap();
        assert_eq!(settings.database.url, "postgres://localhost/notifier");
    }

    #[test]
    fn test_production_rejects_plain_http_api() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = clean_env();
        let dir = setup_config_dir(&[("default.toml", BASE)]);
        env.set(CONFIG_DIR_ENV, dir.path().to_str().unwrap());
        env.set("NOTIFIER_TELEGRAM__API_BASE_URL", "http://localhost:8081");

        let loader = ConfigLoader::new()
            .unwrap()
            .with_environment(AppEnvironment::Production);
        assert!(loader.load().is_err());

        let loader = ConfigLoader::new()
            .unwrap()
            .with_environment(AppEnvironment::Development);
        assert!(loader.load().is_ok());
    }
}
