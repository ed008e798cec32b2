//! Schema detection and migration to the current on-disk generation.
//!
//! Any file handed to the store (fresh, written by an older release, or
//! already current) is brought to schema generation 2 by
//! [`SchemaManager::ensure_schema`]. The file is classified once per call:
//!
//! | State     | Condition                                         | Action                                   |
//! |-----------|---------------------------------------------------|------------------------------------------|
//! | `Empty`   | neither core table exists                         | create schema, stamp version, seed       |
//! | `Partial` | exactly one core table exists                     | full legacy migration                    |
//! | `Current` | both tables expose every generation-2 column      | re-apply schema, re-stamp, seed if empty |
//! | `Legacy`  | tables exist without generation-2 columns         | full legacy migration                    |
//!
//! ## Legacy migration
//!
//! Legacy categories and the items that still belong to one of them are read
//! first. Items whose due date does not parse to a calendar date are dropped.
//! The rewrite then runs in a single transaction: every recognized legacy
//! table is dropped, the current schema is created, categories come back as
//! `dated` with their original identifiers, items come back open and live,
//! and the version marker is stamped. Identifiers are preserved so item
//! foreign keys and external links keep pointing at the same rows.
//!
//! ## Usage
//!
//! ```rust
//! use todo004::db::migrations::{get_schema_version, SchemaManager, SCHEMA_VERSION};
//! use rusqlite::Connection;
//!
//! let mut conn = Connection::open_in_memory().unwrap();
//! SchemaManager::new().ensure_schema(&mut conn).unwrap();
//! assert_eq!(get_schema_version(&conn).unwrap().as_deref(), Some(SCHEMA_VERSION));
//! ```

use super::query::{scalar, Query};
use crate::libs::category::CategoryKind;
use crate::libs::dates::{normalize_date_time, normalize_optional_date, now_iso};
use crate::libs::error::StoreResult;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_info};
use chrono::NaiveDate;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;

/// Generation the store writes and expects.
pub const SCHEMA_VERSION: &str = "2";

const META_SCHEMA_VERSION: &str = "schema_version";

/// Idempotent definition of the current schema.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS app_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ms_category (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    category_type TEXT NOT NULL CHECK(category_type IN ('dated', 'plain')),
    sort_order INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE TABLE IF NOT EXISTS tr_todo (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    id_category INTEGER NOT NULL,
    title TEXT NOT NULL,
    detail TEXT NOT NULL DEFAULT '',
    do_at TEXT,
    created_at TEXT NOT NULL,
    completed_at TEXT,
    deleted_at TEXT,
    FOREIGN KEY (id_category) REFERENCES ms_category(id)
);

CREATE INDEX IF NOT EXISTS idx_todo_category_doat ON tr_todo(id_category, do_at);
CREATE INDEX IF NOT EXISTS idx_todo_category_completed ON tr_todo(id_category, completed_at);
CREATE INDEX IF NOT EXISTS idx_category_type ON ms_category(category_type);
";

/// Tables removed before the schema is recreated, dependents first.
const LEGACY_TABLES: &[&str] = &["test_table", "d_tr_todo", "tr_todo", "d_ms_category", "ms_category", "app_meta"];

const CATEGORY_V2_COLUMNS: &[&str] = &["category_type", "sort_order", "deleted_at"];
const TODO_V2_COLUMNS: &[&str] = &["completed_at", "deleted_at"];

/// Categories created for a database that has none.
pub const DEFAULT_CATEGORIES: [(&str, CategoryKind); 2] = [("General", CategoryKind::Dated), ("Someday", CategoryKind::Plain)];

const SELECT_TABLE_EXISTS: &str = "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1";
const SELECT_COLUMN_NAMES: &str = "SELECT name FROM pragma_table_info(?1)";
const SELECT_META: &str = "SELECT value FROM app_meta WHERE key = ?1";
const UPSERT_META: &str = "INSERT INTO app_meta (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = excluded.value";
const COUNT_LIVE_CATEGORIES: &str = "SELECT COUNT(1) FROM ms_category WHERE deleted_at IS NULL";
const INSERT_DEFAULT_CATEGORY: &str = "INSERT INTO ms_category (name, category_type, sort_order, created_at, deleted_at) VALUES (?1, ?2, ?3, ?4, NULL)";
const INSERT_LEGACY_CATEGORY: &str = "INSERT INTO ms_category (id, name, category_type, sort_order, created_at, deleted_at) VALUES (?1, ?2, 'dated', ?3, ?4, NULL)";
const INSERT_LEGACY_TODO: &str = "INSERT INTO tr_todo (id, id_category, title, detail, do_at, created_at, completed_at, deleted_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, NULL)";

const SELECT_LEGACY_CATEGORIES: Query<LegacyCategory> = Query::new("SELECT id, name FROM ms_category ORDER BY id", 2, map_legacy_category);
const SELECT_LEGACY_CATEGORIES_LIVE: Query<LegacyCategory> = Query::new(
    "SELECT mc.id, mc.name
     FROM ms_category mc
     LEFT JOIN d_ms_category dc ON dc.id = mc.id
     WHERE dc.id IS NULL
     ORDER BY mc.id",
    2,
    map_legacy_category,
);
const SELECT_LEGACY_TODOS: Query<LegacyTodoRow> = Query::new("SELECT id, id_category, title, detail, do_at, created_at FROM tr_todo ORDER BY id", 6, map_legacy_todo);
const SELECT_LEGACY_TODOS_LIVE: Query<LegacyTodoRow> = Query::new(
    "SELECT tt.id, tt.id_category, tt.title, tt.detail, tt.do_at, tt.created_at
     FROM tr_todo tt
     LEFT JOIN d_tr_todo dt ON dt.id = tt.id
     WHERE dt.id IS NULL
     ORDER BY tt.id",
    6,
    map_legacy_todo,
);

/// Layout classification of an on-disk file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Empty,
    Partial,
    Current,
    Legacy,
}

/// What one [`SchemaManager::ensure_schema`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub state: SchemaState,
    pub categories_migrated: usize,
    pub todos_migrated: usize,
    pub todos_dropped: usize,
    pub seeded_defaults: bool,
}

impl MigrationReport {
    fn new(state: SchemaState) -> Self {
        MigrationReport {
            state,
            categories_migrated: 0,
            todos_migrated: 0,
            todos_dropped: 0,
            seeded_defaults: false,
        }
    }
}

#[derive(Debug, Clone)]
struct LegacyCategory {
    id: i64,
    name: String,
}

#[derive(Debug, Clone)]
struct LegacyTodoRow {
    id: i64,
    category_id: Option<i64>,
    title: Option<String>,
    detail: Option<String>,
    do_at: Option<String>,
    created_at: Option<String>,
}

#[derive(Debug, Clone)]
struct LegacyTodo {
    id: i64,
    category_id: i64,
    title: String,
    detail: String,
    do_at: NaiveDate,
    created_at: String,
}

/// Reads a column of unknown affinity as text. Older files were written
/// without type discipline, so numbers and blobs show up in text columns.
fn loose_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(value) => Some(value.to_string()),
        ValueRef::Real(value) => Some(value.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
    })
}

/// Reads a reference column loosely. Integral numbers and numeric text
/// resolve to an id; anything else resolves to none.
fn loose_id(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<i64>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(value) => Some(value),
        ValueRef::Real(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => Some(value as i64),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok().and_then(|text| text.trim().parse().ok()),
        ValueRef::Null | ValueRef::Real(_) | ValueRef::Blob(_) => None,
    })
}

fn map_legacy_category(row: &Row<'_>) -> rusqlite::Result<LegacyCategory> {
    Ok(LegacyCategory {
        id: row.get(0)?,
        name: loose_text(row, 1)?.unwrap_or_default(),
    })
}

fn map_legacy_todo(row: &Row<'_>) -> rusqlite::Result<LegacyTodoRow> {
    Ok(LegacyTodoRow {
        id: row.get(0)?,
        category_id: loose_id(row, 1)?,
        title: loose_text(row, 2)?,
        detail: loose_text(row, 3)?,
        do_at: loose_text(row, 4)?,
        created_at: loose_text(row, 5)?,
    })
}

pub fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let count: i64 = scalar(conn, SELECT_TABLE_EXISTS, params![table])?;
    Ok(count > 0)
}

pub fn column_names(conn: &Connection, table: &str) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare(SELECT_COLUMN_NAMES)?;
    let names = stmt.query_map(params![table], |row| row.get::<_, String>(0))?.collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Reads the version marker, `None` when the file has no metadata table yet.
pub fn get_schema_version(conn: &Connection) -> StoreResult<Option<String>> {
    if !table_exists(conn, "app_meta")? {
        return Ok(None);
    }
    let value = conn.query_row(SELECT_META, params![META_SCHEMA_VERSION], |row| row.get::<_, String>(0));
    match value {
        Ok(version) => Ok(Some(version)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Drives the schema state machine.
pub struct SchemaManager {
    defaults: Vec<(String, CategoryKind)>,
}

impl Default for SchemaManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaManager {
    pub fn new() -> Self {
        SchemaManager {
            defaults: DEFAULT_CATEGORIES.iter().map(|(name, kind)| (name.to_string(), *kind)).collect(),
        }
    }

    /// Classifies the layout of the file behind `conn` without changing it.
    pub fn detect(&self, conn: &Connection) -> StoreResult<SchemaState> {
        let has_categories = table_exists(conn, "ms_category")?;
        let has_todos = table_exists(conn, "tr_todo")?;

        match (has_categories, has_todos) {
            (false, false) => Ok(SchemaState::Empty),
            (true, true) => {
                let category_columns = column_names(conn, "ms_category")?;
                let todo_columns = column_names(conn, "tr_todo")?;
                let has_all = |columns: &[String], required: &[&str]| required.iter().all(|name| columns.iter().any(|column| column == name));

                if has_all(&category_columns, CATEGORY_V2_COLUMNS) && has_all(&todo_columns, TODO_V2_COLUMNS) {
                    Ok(SchemaState::Current)
                } else {
                    Ok(SchemaState::Legacy)
                }
            }
            _ => Ok(SchemaState::Partial),
        }
    }

    /// Brings the file to the current generation.
    ///
    /// Any failure is reported as [`StoreError::Migration`](crate::libs::error::StoreError::Migration)
    /// carrying the underlying message. Running it again on a current file
    /// changes nothing.
    pub fn ensure_schema(&self, conn: &mut Connection) -> StoreResult<MigrationReport> {
        self.run(conn).map_err(|e| e.into_migration())
    }

    fn run(&self, conn: &mut Connection) -> StoreResult<MigrationReport> {
        let state = self.detect(conn)?;
        msg_debug!(Message::SchemaStateDetected(format!("{:?}", state)));

        match state {
            SchemaState::Empty => {
                let mut report = MigrationReport::new(state);
                let tx = conn.transaction()?;
                tx.execute_batch(SCHEMA_SQL)?;
                Self::upsert_meta(&tx, META_SCHEMA_VERSION, SCHEMA_VERSION)?;
                report.seeded_defaults = self.seed_defaults_if_empty(&tx)?;
                tx.commit()?;
                msg_debug!(Message::SchemaCreated);
                Ok(report)
            }
            SchemaState::Current => {
                let mut report = MigrationReport::new(state);
                let tx = conn.transaction()?;
                tx.execute_batch(SCHEMA_SQL)?;
                Self::upsert_meta(&tx, META_SCHEMA_VERSION, SCHEMA_VERSION)?;
                report.seeded_defaults = self.seed_defaults_if_empty(&tx)?;
                tx.commit()?;
                msg_debug!(Message::SchemaUpToDate);
                Ok(report)
            }
            SchemaState::Partial | SchemaState::Legacy => {
                msg_info!(Message::LegacySchemaDetected);
                self.migrate_legacy(conn, state)
            }
        }
    }

    fn migrate_legacy(&self, conn: &mut Connection, state: SchemaState) -> StoreResult<MigrationReport> {
        let mut report = MigrationReport::new(state);

        let categories = Self::read_legacy_categories(conn)?;
        let valid_ids: HashSet<i64> = categories.iter().map(|category| category.id).collect();
        let (todos, dropped) = Self::read_legacy_todos(conn, &valid_ids)?;

        let tx = conn.transaction()?;
        for table in LEGACY_TABLES {
            tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
        }
        tx.execute_batch(SCHEMA_SQL)?;

        let now = now_iso();
        if categories.is_empty() {
            report.seeded_defaults = self.seed_defaults_if_empty(&tx)?;
        } else {
            for (index, category) in categories.iter().enumerate() {
                tx.execute(INSERT_LEGACY_CATEGORY, params![category.id, category.name, index as i64 + 1, now])?;
            }
        }

        for todo in &todos {
            tx.execute(
                INSERT_LEGACY_TODO,
                params![todo.id, todo.category_id, todo.title, todo.detail, todo.do_at.format("%Y-%m-%d").to_string(), todo.created_at],
            )?;
        }

        Self::upsert_meta(&tx, META_SCHEMA_VERSION, SCHEMA_VERSION)?;
        tx.commit()?;

        report.categories_migrated = categories.len();
        report.todos_migrated = todos.len();
        report.todos_dropped = dropped;
        msg_info!(Message::LegacyMigrated(report.categories_migrated, report.todos_migrated, report.todos_dropped));
        Ok(report)
    }

    fn read_legacy_categories(conn: &Connection) -> StoreResult<Vec<LegacyCategory>> {
        if !table_exists(conn, "ms_category")? {
            return Ok(Vec::new());
        }
        let query = if table_exists(conn, "d_ms_category")? { &SELECT_LEGACY_CATEGORIES_LIVE } else { &SELECT_LEGACY_CATEGORIES };
        query.all(conn, [])
    }

    /// Returns the surviving items and the number dropped for a missing or
    /// unknown category or an unreadable due date.
    fn read_legacy_todos(conn: &Connection, valid_ids: &HashSet<i64>) -> StoreResult<(Vec<LegacyTodo>, usize)> {
        if !table_exists(conn, "tr_todo")? {
            return Ok((Vec::new(), 0));
        }
        let query = if table_exists(conn, "d_tr_todo")? { &SELECT_LEGACY_TODOS_LIVE } else { &SELECT_LEGACY_TODOS };

        let mut todos = Vec::new();
        let mut dropped = 0;
        for row in query.all(conn, [])? {
            let Some(category_id) = row.category_id.filter(|id| valid_ids.contains(id)) else {
                dropped += 1;
                continue;
            };
            let Some(do_at) = normalize_optional_date(row.do_at.as_deref()) else {
                dropped += 1;
                continue;
            };

            todos.push(LegacyTodo {
                id: row.id,
                category_id,
                title: row.title.unwrap_or_default(),
                detail: row.detail.unwrap_or_default(),
                do_at,
                created_at: normalize_date_time(row.created_at.as_deref()),
            });
        }
        Ok((todos, dropped))
    }

    fn upsert_meta(conn: &Connection, key: &str, value: &str) -> StoreResult<()> {
        conn.execute(UPSERT_META, params![key, value])?;
        Ok(())
    }

    /// Inserts the default categories when no live category remains.
    fn seed_defaults_if_empty(&self, conn: &Connection) -> StoreResult<bool> {
        let count: i64 = scalar(conn, COUNT_LIVE_CATEGORIES, [])?;
        if count > 0 {
            return Ok(false);
        }

        let now = now_iso();
        for (index, (name, kind)) in self.defaults.iter().enumerate() {
            conn.execute(INSERT_DEFAULT_CATEGORY, params![name, kind, index as i64 + 1, now])?;
        }
        msg_debug!(Message::DefaultCategoriesSeeded(self.defaults.len()));
        Ok(true)
    }
}
