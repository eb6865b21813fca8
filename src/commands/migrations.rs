use super::ConfigArgs;
use crate::db::db::Db;
use crate::db::migrations::{get_db_version, needs_migration, MigrationManager};
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::{msg_info, msg_print};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct MigrationsArgs {
    #[command(subcommand)]
    command: MigrationsCommand,
}

#[derive(Debug, Subcommand)]
enum MigrationsCommand {
    #[command(about = "Show the schema version")]
    Status,
    #[command(about = "List applied migrations")]
    History,
}

pub fn cmd(config_args: &ConfigArgs, args: MigrationsArgs) -> Result<()> {
    let config = Config::read(config_args.config.as_deref())?;
    let conn = Db::new_without_migrations(config.db_path()?)?;

    match args.command {
        MigrationsCommand::Status => {
            msg_print!(Message::DatabaseVersion(get_db_version(&conn)?));
            if needs_migration(&conn)? {
                msg_info!(Message::DatabaseNeedsUpdate);
            } else {
                msg_info!(Message::DatabaseUpToDate);
            }
        }
        MigrationsCommand::History => {
            let history = MigrationManager::new().get_migration_history(&conn)?;

            msg_print!(Message::MigrationHistory, true);
            for (version, name, applied_at) in history {
                println!("  v{}: {} (applied: {})", version, name, applied_at);
            }
        }
    }

    Ok(())
}
