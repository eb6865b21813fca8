use super::ConfigArgs;
use crate::db::db::Db;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::server;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind, overriding the configuration
    #[arg(long)]
    host: Option<String>,
    /// Port to bind, overriding the configuration
    #[arg(long, short)]
    port: Option<u16>,
}

pub async fn cmd(config_args: &ConfigArgs, args: ServeArgs) -> Result<()> {
    let mut config = Config::read(config_args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let db = Db::open(config.db_path()?)?;
    tracing::info!("{}", Message::DatabaseOpened(db.path().display().to_string()));

    server::serve(&config, db).await
}
