use super::categories::Categories;
use super::query::Query;
use crate::libs::category::CategoryKind;
use crate::libs::dates::{date_key, normalize_optional_date, now_iso};
use crate::libs::error::{StoreError, StoreResult};
use crate::libs::todo::{NewTodo, Page, TodoItem};
use rusqlite::{params, Connection, Row};

const INSERT_TODO: &str = "INSERT INTO tr_todo (id_category, title, detail, do_at, created_at, completed_at, deleted_at) VALUES (?1, ?2, ?3, ?4, ?5, NULL, NULL)";
// Reopening an item of a plain category drops the due date it kept while
// completed, so open items of plain categories never carry one.
const TOGGLE_COMPLETION: &str = "UPDATE tr_todo
    SET completed_at = CASE WHEN completed_at IS NULL THEN ?1 ELSE NULL END,
        do_at = CASE
            WHEN completed_at IS NOT NULL
             AND (SELECT category_type FROM ms_category WHERE id = tr_todo.id_category) = 'plain' THEN NULL
            ELSE do_at
        END
    WHERE id = ?2 AND deleted_at IS NULL";
const DISCARD_TODO: &str = "UPDATE tr_todo SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL AND completed_at IS NOT NULL";
const RESTORE_TODO: &str = "UPDATE tr_todo
    SET completed_at = NULL,
        deleted_at = NULL,
        do_at = CASE
            WHEN (SELECT category_type FROM ms_category WHERE id = tr_todo.id_category) = 'plain' THEN NULL
            ELSE do_at
        END
    WHERE id = ?1";
const ERASE_UNCOMPLETED: &str = "DELETE FROM tr_todo WHERE id = ?1 AND completed_at IS NULL AND deleted_at IS NULL";

const SELECT_ACTIVE: Query<TodoItem> = Query::new(
    "SELECT id, id_category, title, detail, do_at, created_at, completed_at, deleted_at
     FROM tr_todo
     WHERE deleted_at IS NULL
     ORDER BY
         CASE WHEN completed_at IS NULL THEN 0 ELSE 1 END,
         CASE WHEN do_at IS NULL THEN 1 ELSE 0 END,
         do_at ASC,
         created_at DESC",
    8,
    map_todo,
);
const SELECT_COMPLETED_PAGE: Query<TodoItem> = Query::new(
    "SELECT id, id_category, title, detail, do_at, created_at, completed_at, deleted_at
     FROM tr_todo
     WHERE completed_at IS NOT NULL
     ORDER BY completed_at DESC
     LIMIT ?1 OFFSET ?2",
    8,
    map_todo,
);
const SELECT_BY_ID: Query<TodoItem> = Query::new(
    "SELECT id, id_category, title, detail, do_at, created_at, completed_at, deleted_at
     FROM tr_todo
     WHERE id = ?1",
    8,
    map_todo,
);
// Most recent row wins for duplicated titles. LIKE narrows the scan, the
// substr comparison makes the prefix match case-sensitive.
const SEARCH_TITLES: Query<String> = Query::new(
    r"SELECT title
      FROM (
          SELECT title, MAX(id) AS latest_id
          FROM tr_todo
          WHERE deleted_at IS NULL
            AND title LIKE ?1 ESCAPE '\'
            AND substr(title, 1, length(?2)) = ?2
          GROUP BY title
      ) grouped
      ORDER BY latest_id DESC
      LIMIT ?3",
    1,
    map_title,
);

fn map_title(row: &Row<'_>) -> rusqlite::Result<String> {
    row.get(0)
}

fn map_todo(row: &Row<'_>) -> rusqlite::Result<TodoItem> {
    let due_date: Option<String> = row.get(4)?;
    Ok(TodoItem {
        id: row.get(0)?,
        category_id: row.get(1)?,
        title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        detail: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        due_date: normalize_optional_date(due_date.as_deref()),
        created_at: row.get::<_, Option<String>>(5)?.unwrap_or_else(now_iso),
        completed_at: row.get(6)?,
        deleted_at: row.get(7)?,
    })
}

/// Escapes `\`, `%` and `_` so user text matches literally in a LIKE pattern.
pub fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub struct Todos<'a> {
    conn: &'a Connection,
}

impl<'a> Todos<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, id: i64) -> StoreResult<Option<TodoItem>> {
        SELECT_BY_ID.first(self.conn, params![id])
    }

    /// Every item not soft-deleted: open ones first, dated before undated,
    /// by due date, newest first.
    pub fn list_active(&self) -> StoreResult<Vec<TodoItem>> {
        SELECT_ACTIVE.all(self.conn, [])
    }

    /// Completed items, discarded ones included, newest completion first.
    pub fn list_completed(&self, page: Page) -> StoreResult<Vec<TodoItem>> {
        SELECT_COMPLETED_PAGE.all(self.conn, params![page.limit, page.offset])
    }

    /// Creates an open item and returns its id.
    ///
    /// Items of a `plain` category never store a due date; items of a `dated`
    /// category must supply one that normalizes to a calendar date.
    pub fn insert(&self, todo: &NewTodo) -> StoreResult<i64> {
        let category = Categories::new(self.conn)
            .get(todo.category_id)?
            .ok_or_else(|| StoreError::validation(format!("category {} not found", todo.category_id)))?;

        let title = todo.title.trim();
        if title.is_empty() {
            return Err(StoreError::validation("title is required"));
        }

        let due_date = match category.kind {
            CategoryKind::Plain => None,
            CategoryKind::Dated => {
                let date = normalize_optional_date(todo.due_date.as_deref())
                    .ok_or_else(|| StoreError::validation(format!("a due date is required for dated category '{}'", category.name)))?;
                Some(date_key(date))
            }
        };

        self.conn.execute(INSERT_TODO, params![category.id, title, todo.detail.trim(), due_date, now_iso()])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Flips the completion stamp of a live item.
    pub fn toggle_completion(&self, id: i64) -> StoreResult<()> {
        let affected = self.conn.execute(TOGGLE_COMPLETION, params![now_iso(), id])?;
        if affected == 0 {
            return Err(StoreError::validation(format!("todo {} not found or already discarded", id)));
        }
        Ok(())
    }

    /// Soft-deletes a completed, live item.
    pub fn discard(&self, id: i64) -> StoreResult<()> {
        let affected = self.conn.execute(DISCARD_TODO, params![now_iso(), id])?;
        if affected == 0 {
            return Err(StoreError::validation(format!("todo {} must be completed before it can be discarded", id)));
        }
        Ok(())
    }

    /// Clears both completion and deletion stamps.
    pub fn restore(&self, id: i64) -> StoreResult<()> {
        let affected = self.conn.execute(RESTORE_TODO, params![id])?;
        if affected == 0 {
            return Err(StoreError::validation(format!("todo {} not found", id)));
        }
        Ok(())
    }

    /// Removes an item that was never completed.
    pub fn erase_uncompleted(&self, id: i64) -> StoreResult<()> {
        let affected = self.conn.execute(ERASE_UNCOMPLETED, params![id])?;
        if affected == 0 {
            return Err(StoreError::validation(format!("todo {} is completed, discarded or missing", id)));
        }
        Ok(())
    }

    /// Distinct live titles starting with `prefix`, most recently added first.
    pub fn search_titles(&self, prefix: &str, limit: usize) -> StoreResult<Vec<String>> {
        if prefix.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let pattern = format!("{}%", escape_like_pattern(prefix));
        SEARCH_TITLES.all(self.conn, params![pattern, prefix, limit as i64])
    }
}
