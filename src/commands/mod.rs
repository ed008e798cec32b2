//! Command-line interface.
//!
//! Each subcommand lives in its own module with an `Args` struct and an async
//! `cmd` entry point. All of them talk to the database through
//! [`TodoStore`]; the global `--db` flag points the store at a specific file
//! instead of the one named in `config.json`.

pub mod calendar;
pub mod category;
pub mod export;
pub mod import;
pub mod init;
pub mod status;
pub mod suggest;
pub mod todo;

use crate::libs::config::Config;
use crate::libs::store::TodoStore;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Create the configuration and database")]
    Init(init::InitArgs),
    #[command(about = "Show database location and schema state")]
    Status,
    #[command(about = "Manage categories")]
    Category(category::CategoryArgs),
    #[command(about = "Manage todos")]
    Todo(todo::TodoArgs),
    #[command(about = "Show dated todos per day")]
    Calendar,
    #[command(about = "Suggest titles starting with a prefix")]
    Suggest(suggest::SuggestArgs),
    #[command(about = "Copy the database to a file")]
    Export(export::ExportArgs),
    #[command(about = "Replace the database with a file", arg_required_else_help = true)]
    Import(import::ImportArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    /// Use this database file instead of the configured one
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        let config = Config::read()?;
        let store = open_store(&config, cli.db)?;

        match cli.command {
            Commands::Init(args) => init::cmd(args, config, store).await,
            Commands::Status => status::cmd(store).await,
            Commands::Category(args) => category::cmd(args, store).await,
            Commands::Todo(args) => todo::cmd(args, store).await,
            Commands::Calendar => calendar::cmd(store).await,
            Commands::Suggest(args) => suggest::cmd(args, store).await,
            Commands::Export(args) => export::cmd(args, config, store).await,
            Commands::Import(args) => import::cmd(args, store).await,
        }
    }
}

fn open_store(config: &Config, db: Option<PathBuf>) -> Result<TodoStore> {
    let store = match db {
        Some(path) => TodoStore::with_config(path, config)?,
        None => TodoStore::open(config)?,
    };
    Ok(store)
}
