use super::ConfigArgs;
use crate::db::db::Db;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::msg_success;
use anyhow::Result;

pub fn cmd(config_args: &ConfigArgs) -> Result<()> {
    let config = Config::read(config_args.config.as_deref())?;
    let db = Db::open(config.db_path()?)?;
    msg_success!(Message::DatabaseInitialized(db.path().display().to_string()));

    Ok(())
}
