use super::query::Query;
use crate::libs::error::{StoreError, StoreResult};
use rusqlite::{Connection, OpenFlags, Params, MAIN_DB};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DB_FILE_NAME: &str = "todo004.db";

/// Owner of the single connection to the backing file.
///
/// A `Db` starts closed; [`Db::open`] opens (or creates) the file and turns on
/// foreign-key enforcement. Every statement goes through [`Db::execute`],
/// [`Db::query`] or [`Db::conn_mut`] so a closed handle surfaces as a
/// [`StoreError::Connection`] rather than a panic.
pub struct Db {
    path: PathBuf,
    conn: Option<Connection>,
}

impl Db {
    /// Creates a closed gateway for an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Db {
        Db { path: path.into(), conn: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Opens or creates the backing file. A no-op when already open.
    ///
    /// Fails with [`StoreError::Connection`] when the engine cannot open the
    /// file or the file is not a readable database.
    pub fn open(&mut self) -> StoreResult<()> {
        if self.conn.is_some() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::connection(format!("{}: {}", parent.display(), e)))?;
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI;
        let conn = Connection::open_with_flags(&self.path, flags).map_err(|e| StoreError::connection(format!("{}: {}", self.path.display(), e)))?;

        // Opening is lazy in SQLite; touching the schema catches files that
        // are not databases at all.
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
            .map_err(|e| StoreError::connection(format!("{}: {}", self.path.display(), e)))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| StoreError::connection(e.to_string()))?;

        debug!(path = %self.path.display(), "database opened");
        self.conn = Some(conn);
        Ok(())
    }

    /// Releases the handle. Close failures are logged and swallowed since a
    /// close is normally followed by a fresh open.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            match conn.close() {
                Ok(()) => debug!(path = %self.path.display(), "database closed"),
                Err((_, e)) => warn!(error = %e, "ignoring failure while closing database"),
            }
        }
    }

    pub fn conn(&self) -> StoreResult<&Connection> {
        self.conn.as_ref().ok_or_else(|| StoreError::connection("database is not open"))
    }

    pub fn conn_mut(&mut self) -> StoreResult<&mut Connection> {
        self.conn.as_mut().ok_or_else(|| StoreError::connection("database is not open"))
    }

    /// Runs one statement and returns the number of affected rows.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> StoreResult<usize> {
        Ok(self.conn()?.execute(sql, params)?)
    }

    /// Runs a typed query and collects every row.
    pub fn query<T, P: Params>(&self, query: &Query<T>, params: P) -> StoreResult<Vec<T>> {
        query.all(self.conn()?, params)
    }

    /// Serializes the open main database through the engine, so pages still
    /// sitting in a write-ahead log are included.
    pub fn serialize(&self) -> StoreResult<Vec<u8>> {
        let data = self.conn()?.serialize(MAIN_DB)?;
        Ok(data.to_vec())
    }

    /// Replaces the backing file. The handle must be closed first.
    ///
    /// Leftover `-wal`/`-shm` files belong to the old content and are removed
    /// so they are never replayed onto the new one.
    pub fn write_file(&self, bytes: &[u8]) -> StoreResult<()> {
        if self.conn.is_some() {
            return Err(StoreError::connection("cannot replace the database file while it is open"));
        }
        for suffix in ["-wal", "-shm"] {
            let mut sidecar = self.path.clone().into_os_string();
            sidecar.push(suffix);
            match fs::remove_file(&sidecar) {
                Ok(()) => debug!(path = %Path::new(&sidecar).display(), "removed stale journal file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

impl Drop for Db {
    fn drop(&mut self) {
        self.close();
    }
}
