//! Database export command.
//!
//! The file is written next to its destination under a temporary name and
//! renamed into place once complete, so an interrupted export never leaves a
//! truncated database behind. A leftover temporary file is removed on a
//! best-effort basis.

use crate::{
    libs::{config::Config, messages::Message, store::TodoStore},
    msg_success,
};
use anyhow::Result;
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output file, defaults to the configured export name in the current directory
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn cmd(args: ExportArgs, config: Config, mut store: TodoStore) -> Result<()> {
    let output = args.output.unwrap_or_else(|| PathBuf::from(&config.export_file_name));
    let bytes = store.export_snapshot().await?;

    write_atomically(&output, &bytes)?;
    msg_success!(Message::ExportCompleted(output.display().to_string()));
    Ok(())
}

fn write_atomically(output: &Path, bytes: &[u8]) -> Result<()> {
    let mut temp_name = output.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    temp_name.push(".part");
    let temp_path = output.with_file_name(temp_name);

    let result = fs::write(&temp_path, bytes).and_then(|()| fs::rename(&temp_path, output));
    if let Err(e) = result {
        if temp_path.exists() {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                warn!(error = %cleanup, path = %temp_path.display(), "failed to remove temporary export file");
            }
        }
        return Err(e.into());
    }
    Ok(())
}
