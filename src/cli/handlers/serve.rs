//! `serve` command.

use crate::config::{Environment, Settings};
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
    environment: Environment,
}

impl ServeCommandHandler {
    pub fn new(config: Settings, environment: Environment) -> Self {
        Self {
            config,
            environment,
        }
    }

    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            self.print_summary();
            return Ok(());
        }
        Server::new(self.config, self.environment).run().await
    }

    /// Settings were validated while merging; report what would run.
    fn print_summary(&self) {
        println!("✓ Configuration is valid ({} environment)", self.environment);
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!("✓ Telegram API: {}", self.config.telegram.api_base_url);
        println!(
            "✓ Migrations on startup: {}",
            if self.config.database.auto_migrate { "yes" } else { "no" }
        );
        println!("Dry run completed successfully");
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_does_not_start_server() {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/notifier".to_string();
        let handler = ServeCommandHandler::new(config.clone(), Environment::Test);
        assert_eq!(handler.config(), &config);

        assert!(handler.execute(true).await.is_ok());
    }
}
