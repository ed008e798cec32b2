//! Application settings.
//!
//! Settings live in `config.json` inside the data directory (see
//! [`DataStorage`]). A missing file means defaults; a file that exists but
//! does not parse is an error, so a typo never silently resets the database
//! location.
//!
//! ```json
//! {
//!   "database_file": "todo004.db",
//!   "export_file_name": "todo004.sqlite3",
//!   "suggestion_limit": 10,
//!   "completed_page_size": 100
//! }
//! ```

use super::data_storage::DataStorage;
use crate::db::db::DB_FILE_NAME;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Fixed name of the file produced by an export.
pub const EXPORT_FILE_NAME: &str = "todo004.sqlite3";

/// Extensions offered when picking a file to import.
pub const IMPORT_EXTENSIONS: &[&str] = &["sqlite", "sqlite3", "db"];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Database file name inside the data directory, or an absolute path.
    pub database_file: String,
    /// Name given to exported snapshots.
    pub export_file_name: String,
    /// Maximum number of title suggestions returned.
    pub suggestion_limit: usize,
    /// Page size for the completed-item history.
    pub completed_page_size: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_file: DB_FILE_NAME.to_string(),
            export_file_name: EXPORT_FILE_NAME.to_string(),
            suggestion_limit: 10,
            completed_page_size: 100,
        }
    }
}

impl Config {
    /// Reads `config.json` from the default data directory.
    pub fn read() -> Result<Config> {
        Self::read_from(&DataStorage::new())
    }

    pub fn read_from(storage: &DataStorage) -> Result<Config> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&DataStorage::new())
    }

    pub fn save_to(&self, storage: &DataStorage) -> Result<()> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Resolves the database location against `storage`.
    pub fn database_path(&self, storage: &DataStorage) -> Result<PathBuf> {
        let file = Path::new(&self.database_file);
        if file.is_absolute() {
            return Ok(file.to_path_buf());
        }
        Ok(storage.get_path(&self.database_file)?)
    }

    /// True when `path` carries one of the extensions accepted for import.
    pub fn is_importable(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMPORT_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}
