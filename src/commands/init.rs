//! First-run setup.
//!
//! Writes `config.json` with default settings (unless one exists or `--reset`
//! is given) and initializes the database so the default categories are in
//! place.

use crate::{
    libs::{config::Config, data_storage::DataStorage, messages::Message, store::TodoStore},
    msg_info, msg_success,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing configuration with defaults
    #[arg(short, long)]
    reset: bool,
}

pub async fn cmd(args: InitArgs, config: Config, mut store: TodoStore) -> Result<()> {
    let storage = DataStorage::new();
    let config_path = storage.get_path(crate::libs::config::CONFIG_FILE_NAME)?;

    if args.reset || !config_path.exists() {
        let config = if args.reset { Config::default() } else { config };
        config.save_to(&storage)?;
        msg_success!(Message::ConfigSaved);
    }
    msg_info!(Message::ConfigPath(config_path.display().to_string()));

    store.initialize().await?;
    msg_success!(Message::StoreInitialized(store.path().display().to_string()));
    Ok(())
}
