//! Dispatches a parsed command once configuration is settled.

use super::handlers::{
    InfoCommandHandler, ItemsCommandHandler, MigrateCommandHandler, ServeCommandHandler,
};
use super::parser::{Cli, Commands};
use crate::config::Environment;
use crate::config::settings::Settings;

/// Run the command `cli` names; no subcommand means `serve`.
pub async fn execute_command(cli: &Cli, settings: Settings) -> anyhow::Result<()> {
    cli.validate().map_err(anyhow::Error::msg)?;

    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings).execute(*dry_run).await
        }
        None => ServeCommandHandler::new(settings).execute(false).await,
        Some(Commands::Migrate { dry_run, rollback }) => {
            if let Some(steps) = rollback
                && *steps > 50
            {
                tracing::warn!(steps, "Rolling back a large number of migrations");
            }
            MigrateCommandHandler::new(settings)
                .execute(*dry_run, *rollback)
                .await?;
            Ok(())
        }
        Some(Commands::Info) => {
            let environment = cli.env.map(Into::into).unwrap_or_else(Environment::from_env);
            InfoCommandHandler::new(settings, environment).execute();
            Ok(())
        }
        Some(Commands::SeedDb { count }) => {
            ItemsCommandHandler::connect(&settings).await?.seed(*count).await?;
            Ok(())
        }
        Some(Commands::ListItems { limit }) => {
            ItemsCommandHandler::connect(&settings).await?.list(*limit).await?;
            Ok(())
        }
        Some(Commands::CountItems) => {
            ItemsCommandHandler::connect(&settings).await?.count().await?;
            Ok(())
        }
        Some(Commands::ClearItems { yes }) => {
            let handler = ItemsCommandHandler::connect(&settings).await?;
            handler.clear(*yes, &mut std::io::stdin().lock()).await?;
            Ok(())
        }
    }
}
