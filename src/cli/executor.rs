//! Dispatches a parsed command to its handler.

use super::handlers::{MigrateCommandHandler, NotifyCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::{Environment, Settings};
use crate::services::notifications::Notification;

/// Runs `cli.command`; no subcommand means `serve`.
pub async fn execute_command(
    cli: Cli,
    settings: Settings,
    environment: Environment,
) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings, environment)
                .execute(dry_run)
                .await
        }
        None => {
            ServeCommandHandler::new(settings, environment)
                .execute(false)
                .await
        }
        Some(Commands::Migrate { dry_run, rollback }) => {
            MigrateCommandHandler::new(settings)
                .execute(dry_run, rollback)
                .await?;
            Ok(())
        }
        Some(Commands::Notify {
            body,
            header,
            full_text,
            url,
        }) => {
            let notification = Notification {
                header,
                short_text: body,
                full_text,
                url,
            };
            NotifyCommandHandler::new(settings)
                .execute(notification)
                .await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn test_serve_dry_run() {
        let cli = Cli::try_parse_from(["notifier-rs", "serve", "--dry-run"]).unwrap();
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost/notifier".to_string();

        assert!(
            execute_command(cli, settings, Environment::Test)
                .await
                .is_ok()
        );
    }
}
