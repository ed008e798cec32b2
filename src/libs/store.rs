//! The store facade consumed by the command layer.
//!
//! [`TodoStore`] owns the database worker and the latest [`Snapshot`]. Every
//! mutating call follows the same cycle:
//!
//! 1. make sure the store is initialized (open + schema lifecycle),
//! 2. run the statement(s) on the worker thread,
//! 3. reload categories and items and publish a fresh snapshot.
//!
//! Reads never touch the database; they go through [`TodoStore::snapshot`],
//! which stays valid until the next mutation replaces it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use todo004::libs::category::CategoryKind;
//! use todo004::libs::store::TodoStore;
//! use todo004::libs::todo::NewTodo;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let mut store = TodoStore::at_path("/tmp/todo004.db")?;
//! store.load().await?;
//!
//! let work = store.add_category("Work", CategoryKind::Dated).await?;
//! if let Some(id) = work {
//!     store.add_todo(NewTodo::new(id, "Ship release", "", Some("2025-06-01"))).await?;
//! }
//!
//! let snapshot = store.snapshot();
//! println!("{} dates scheduled", snapshot.date_span().len());
//! # Ok(())
//! # }
//! ```

use super::category::{Category, CategoryKind};
use super::config::Config;
use super::data_storage::DataStorage;
use super::error::{StoreError, StoreResult};
use super::snapshot::Snapshot;
use super::todo::{NewTodo, Page, TodoItem};
use crate::db::backup;
use crate::db::categories::Categories;
use crate::db::db::Db;
use crate::db::migrations::{self, MigrationReport};
use crate::db::todos::Todos;
use crate::db::worker::DbWorker;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Rows loaded by one refresh.
type Loaded = (Vec<Category>, Vec<TodoItem>, Vec<TodoItem>);

pub struct TodoStore {
    path: PathBuf,
    worker: DbWorker,
    initialized: bool,
    last_report: Option<MigrationReport>,
    snapshot: Arc<Snapshot>,
    completed_page: Option<Page>,
    suggestions: Vec<String>,
    suggestion_limit: usize,
    completed_page_size: i64,
}

impl TodoStore {
    /// Store over the database named by `config`, resolved against the data directory.
    pub fn open(config: &Config) -> StoreResult<Self> {
        let path = config
            .database_path(&DataStorage::new())
            .map_err(|e| StoreError::connection(e.to_string()))?;
        Self::with_config(path, config)
    }

    /// Store over an explicit file with default settings.
    pub fn at_path(path: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::with_config(path, &Config::default())
    }

    pub fn with_config(path: impl Into<PathBuf>, config: &Config) -> StoreResult<Self> {
        let path = path.into();
        let worker = DbWorker::spawn(Db::at(path.clone()))?;
        Ok(TodoStore {
            path,
            worker,
            initialized: false,
            last_report: None,
            snapshot: Arc::new(Snapshot::default()),
            completed_page: None,
            suggestions: Vec::new(),
            suggestion_limit: config.suggestion_limit,
            completed_page_size: config.completed_page_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// What the schema lifecycle did during the last initialization or import.
    pub fn last_report(&self) -> Option<&MigrationReport> {
        self.last_report.as_ref()
    }

    /// Opens the database and brings it to the current schema.
    ///
    /// Only the first call of a session does any work; later calls return
    /// immediately.
    pub async fn initialize(&mut self) -> StoreResult<()> {
        if self.initialized {
            return Ok(());
        }
        let report = self.worker.call(backup::open_and_migrate).await?;
        debug!(state = ?report.state, "store initialized");
        self.last_report = Some(report);
        self.initialized = true;
        Ok(())
    }

    /// Initializes if needed and loads the first snapshot.
    pub async fn load(&mut self) -> StoreResult<Arc<Snapshot>> {
        self.initialize().await?;
        self.refresh().await?;
        Ok(self.snapshot())
    }

    /// Loads a page of completed history into the snapshot.
    ///
    /// A non-positive `limit` uses the configured page size; a negative
    /// `offset` starts at the beginning. The page is kept for later refreshes.
    pub async fn load_completed(&mut self, limit: i64, offset: i64) -> StoreResult<Arc<Snapshot>> {
        self.completed_page = Some(Page::normalized(limit, offset, self.completed_page_size));
        self.load().await
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Titles produced by the last [`TodoStore::make_suggestions`] call.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub async fn add_category(&mut self, name: &str, kind: CategoryKind) -> StoreResult<Option<i64>> {
        let name = name.to_string();
        self.mutate(move |conn| Categories::new(conn).insert(&name, kind)).await
    }

    pub async fn add_todo(&mut self, todo: NewTodo) -> StoreResult<i64> {
        self.mutate(move |conn| Todos::new(conn).insert(&todo)).await
    }

    pub async fn toggle_completion(&mut self, id: i64) -> StoreResult<()> {
        self.mutate(move |conn| Todos::new(conn).toggle_completion(id)).await
    }

    pub async fn discard(&mut self, id: i64) -> StoreResult<()> {
        self.mutate(move |conn| Todos::new(conn).discard(id)).await
    }

    pub async fn restore(&mut self, id: i64) -> StoreResult<()> {
        self.mutate(move |conn| Todos::new(conn).restore(id)).await
    }

    pub async fn erase_uncompleted(&mut self, id: i64) -> StoreResult<()> {
        self.mutate(move |conn| Todos::new(conn).erase_uncompleted(id)).await
    }

    pub async fn change_category_kind(&mut self, id: i64, kind: CategoryKind) -> StoreResult<()> {
        self.mutate(move |conn| Categories::new(conn).update_kind(id, kind)).await
    }

    /// Returns the number of items deleted along with the category.
    pub async fn soft_delete_category(&mut self, id: i64) -> StoreResult<usize> {
        self.mutate(move |conn| Categories::new(conn).soft_delete(id)).await
    }

    pub async fn reorder_categories(&mut self, ordered_ids: Vec<i64>) -> StoreResult<()> {
        self.mutate(move |conn| Categories::new(conn).reorder(&ordered_ids)).await
    }

    /// Distinct titles starting with `prefix`, most recent first.
    pub async fn search_titles(&mut self, prefix: &str, limit: usize) -> StoreResult<Vec<String>> {
        let prefix = prefix.trim().to_string();
        if prefix.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        self.initialize().await?;
        self.worker.call(move |db| Todos::new(db.conn()?).search_titles(&prefix, limit)).await
    }

    /// Searches with the configured limit and keeps the result in the store.
    pub async fn make_suggestions(&mut self, word: &str) -> StoreResult<&[String]> {
        let limit = self.suggestion_limit;
        self.suggestions = self.search_titles(word, limit).await?;
        Ok(&self.suggestions)
    }

    pub async fn schema_version(&mut self) -> StoreResult<Option<String>> {
        self.initialize().await?;
        self.worker.call(|db| migrations::get_schema_version(db.conn()?)).await
    }

    /// Raw bytes of the database file.
    pub async fn export_snapshot(&mut self) -> StoreResult<Vec<u8>> {
        self.initialize().await?;
        self.worker.call(|db| backup::export_bytes(db)).await
    }

    /// Swaps the database file for `bytes` and migrates it.
    ///
    /// When the replacement cannot be adopted and a database was open
    /// beforehand, that database is put back and the snapshot reloaded from
    /// it; the adoption error is returned either way.
    pub async fn import_snapshot(&mut self, bytes: Vec<u8>) -> StoreResult<MigrationReport> {
        let result = self.worker.call(move |db| backup::import_with_rollback(db, &bytes)).await;

        self.initialized = self.worker.call(|db| Ok(db.is_open())).await?;
        if let Ok(report) = &result {
            self.last_report = Some(report.clone());
        }
        if self.initialized {
            if let Err(e) = self.refresh().await {
                warn!(error = %e, "failed to reload after import");
                if result.is_ok() {
                    return Err(e);
                }
            }
        }
        result
    }

    /// Releases the connection. The next call reopens it.
    pub async fn close(&mut self) -> StoreResult<()> {
        self.worker
            .call(|db| {
                db.close();
                Ok(())
            })
            .await?;
        self.initialized = false;
        Ok(())
    }

    async fn mutate<F, T>(&mut self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.initialize().await?;
        let result = self.worker.call(move |db| f(db.conn()?)).await?;
        self.refresh().await?;
        Ok(result)
    }

    /// Reloads everything the snapshot holds and publishes a new version.
    async fn refresh(&mut self) -> StoreResult<()> {
        let page = self.completed_page;
        let (categories, active, completed): Loaded = self
            .worker
            .call(move |db| {
                let conn = db.conn()?;
                let categories = Categories::new(conn).list()?;
                let todos = Todos::new(conn);
                let active = todos.list_active()?;
                let completed = match page {
                    Some(page) => todos.list_completed(page)?,
                    None => Vec::new(),
                };
                Ok((categories, active, completed))
            })
            .await?;

        let version = self.snapshot.version + 1;
        self.snapshot = Arc::new(Snapshot::build(version, categories, active, completed));
        debug!(version, "snapshot refreshed");
        Ok(())
    }
}
