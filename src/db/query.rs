//! Typed row mapping.
//!
//! A [`Query`] ties a SQL string to the function that decodes one of its rows
//! and to the number of columns that function reads. The column count is
//! checked against the prepared statement before any row is decoded, so a
//! query whose shape drifted from its mapper fails loudly on first use instead
//! of decoding the wrong positions.

use crate::libs::error::{StoreError, StoreResult};
use rusqlite::{Connection, OptionalExtension, Params, Row};

pub type RowMapper<T> = fn(&Row<'_>) -> rusqlite::Result<T>;

pub struct Query<T> {
    sql: &'static str,
    columns: usize,
    map: RowMapper<T>,
}

impl<T> Query<T> {
    pub const fn new(sql: &'static str, columns: usize, map: RowMapper<T>) -> Self {
        Query { sql, columns, map }
    }

    fn check_shape(&self, found: usize) -> StoreResult<()> {
        if found != self.columns {
            return Err(StoreError::Query(format!("query returns {} columns, mapper expects {}: {}", found, self.columns, self.sql.trim())));
        }
        Ok(())
    }

    /// Collects every row.
    pub fn all<P: Params>(&self, conn: &Connection, params: P) -> StoreResult<Vec<T>> {
        let mut stmt = conn.prepare_cached(self.sql)?;
        self.check_shape(stmt.column_count())?;

        let rows = stmt.query_map(params, self.map)?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Returns the first row, if any.
    pub fn first<P: Params>(&self, conn: &Connection, params: P) -> StoreResult<Option<T>> {
        let mut stmt = conn.prepare_cached(self.sql)?;
        self.check_shape(stmt.column_count())?;

        Ok(stmt.query_row(params, self.map).optional()?)
    }
}

/// Reads a single scalar, e.g. a `COUNT(*)`.
pub fn scalar<V: rusqlite::types::FromSql, P: Params>(conn: &Connection, sql: &str, params: P) -> StoreResult<V> {
    Ok(conn.query_row(sql, params, |row| row.get(0))?)
}
