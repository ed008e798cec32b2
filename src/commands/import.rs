//! Database import command.
//!
//! The current database is opened first so it can serve as the backup if the
//! replacement file cannot be adopted.

use crate::{
    libs::{config::Config, messages::Message, store::TodoStore},
    msg_bail_anyhow, msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Database file to import (.sqlite, .sqlite3 or .db)
    path: PathBuf,
    /// Replace without asking
    #[arg(short, long)]
    yes: bool,
}

pub async fn cmd(args: ImportArgs, mut store: TodoStore) -> Result<()> {
    let display = args.path.display().to_string();
    if !args.path.is_file() {
        msg_bail_anyhow!(Message::ImportFileNotFound(display));
    }
    if !Config::is_importable(&args.path) {
        msg_bail_anyhow!(Message::ImportUnknownExtension(display));
    }

    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmImport(display).to_string())
            .default(false)
            .interact()?;
        if !confirmed {
            msg_info!(Message::OperationCancelled);
            return Ok(());
        }
    }

    let bytes = fs::read(&args.path)?;
    store.initialize().await?;
    let report = store.import_snapshot(bytes).await?;

    msg_success!(Message::ImportCompleted);
    if report.categories_migrated > 0 || report.todos_dropped > 0 {
        msg_print!(Message::LegacyMigrated(report.categories_migrated, report.todos_migrated, report.todos_dropped));
    }
    Ok(())
}
