//! Category persistence.
//!
//! Categories are never removed: deletion stamps `deleted_at` on the category
//! and on every live item in it, sharing one timestamp. Live categories are
//! ordered by `sort_order`, which [`Categories::reorder`] rewrites to `1..N`.

use super::query::{scalar, Query};
use crate::libs::category::{Category, CategoryKind};
use crate::libs::dates::now_iso;
use crate::libs::error::{StoreError, StoreResult};
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;

const SELECT_MAX_SORT_ORDER: &str = "SELECT IFNULL(MAX(sort_order), 0) FROM ms_category WHERE deleted_at IS NULL";
const INSERT_CATEGORY: &str = "INSERT INTO ms_category (name, category_type, sort_order, created_at, deleted_at) VALUES (?1, ?2, ?3, ?4, NULL)";
const UPDATE_KIND: &str = "UPDATE ms_category SET category_type = ?1 WHERE id = ?2 AND deleted_at IS NULL";
const CLEAR_OPEN_DUE_DATES: &str = "UPDATE tr_todo SET do_at = NULL WHERE id_category = ?1 AND deleted_at IS NULL AND completed_at IS NULL";
const SOFT_DELETE_CATEGORY: &str = "UPDATE ms_category SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL";
const SOFT_DELETE_CATEGORY_TODOS: &str = "UPDATE tr_todo SET deleted_at = ?1 WHERE id_category = ?2 AND deleted_at IS NULL";
const UPDATE_SORT_ORDER: &str = "UPDATE ms_category SET sort_order = ?1 WHERE id = ?2 AND deleted_at IS NULL";

const SELECT_LIVE: Query<Category> = Query::new(
    "SELECT id, name, category_type, sort_order
     FROM ms_category
     WHERE deleted_at IS NULL
     ORDER BY sort_order ASC, id ASC",
    4,
    map_category,
);
const SELECT_LIVE_BY_ID: Query<Category> = Query::new(
    "SELECT id, name, category_type, sort_order
     FROM ms_category
     WHERE id = ?1 AND deleted_at IS NULL",
    4,
    map_category,
);

fn map_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        sort_order: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
    })
}

pub struct Categories<'a> {
    conn: &'a Connection,
}

impl<'a> Categories<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Live categories in display order.
    pub fn list(&self) -> StoreResult<Vec<Category>> {
        SELECT_LIVE.all(self.conn, [])
    }

    pub fn get(&self, id: i64) -> StoreResult<Option<Category>> {
        SELECT_LIVE_BY_ID.first(self.conn, params![id])
    }

    /// Creates a category at the end of the order. Blank names are ignored.
    pub fn insert(&self, name: &str, kind: CategoryKind) -> StoreResult<Option<i64>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let max_sort_order: i64 = scalar(self.conn, SELECT_MAX_SORT_ORDER, [])?;
        self.conn.execute(INSERT_CATEGORY, params![name, kind, max_sort_order + 1, now_iso()])?;
        Ok(Some(self.conn.last_insert_rowid()))
    }

    /// Changes the kind of a live category. Switching to `plain` clears the
    /// due date of every open item; completed items keep theirs.
    pub fn update_kind(&self, id: i64, kind: CategoryKind) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let affected = tx.execute(UPDATE_KIND, params![kind, id])?;
        if affected == 0 {
            return Err(StoreError::validation(format!("category {} not found", id)));
        }
        if kind == CategoryKind::Plain {
            tx.execute(CLEAR_OPEN_DUE_DATES, params![id])?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Soft-deletes a category and every live item in it. Returns the number
    /// of items that were deleted along with it.
    pub fn soft_delete(&self, id: i64) -> StoreResult<usize> {
        let now = now_iso();
        let tx = self.conn.unchecked_transaction()?;
        let affected = tx.execute(SOFT_DELETE_CATEGORY, params![now, id])?;
        if affected == 0 {
            return Err(StoreError::validation(format!("category {} not found", id)));
        }
        let todos = tx.execute(SOFT_DELETE_CATEGORY_TODOS, params![now, id])?;
        tx.commit()?;
        Ok(todos)
    }

    /// Assigns sort positions `1..N` in the given order.
    ///
    /// `ordered_ids` must be exactly a permutation of the live category
    /// identifiers; anything else is rejected before a row is touched.
    pub fn reorder(&self, ordered_ids: &[i64]) -> StoreResult<()> {
        let live_ids: Vec<i64> = self.list()?.into_iter().map(|category| category.id).collect();
        validate_permutation(&live_ids, ordered_ids)?;

        let tx = self.conn.unchecked_transaction()?;
        for (index, id) in ordered_ids.iter().enumerate() {
            tx.execute(UPDATE_SORT_ORDER, params![index as i64 + 1, id])?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Checks that `candidate` lists every id of `current` exactly once.
pub fn validate_permutation(current: &[i64], candidate: &[i64]) -> StoreResult<()> {
    let invalid = || StoreError::validation("invalid category order");

    if candidate.len() != current.len() {
        return Err(invalid());
    }
    let unique: HashSet<i64> = candidate.iter().copied().collect();
    if unique.len() != candidate.len() {
        return Err(invalid());
    }
    if !current.iter().all(|id| unique.contains(id)) {
        return Err(invalid());
    }
    Ok(())
}
