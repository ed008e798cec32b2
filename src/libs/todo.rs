use chrono::NaiveDate;

/// A task row as loaded into a snapshot.
///
/// Timestamps are kept as the ISO-8601 text stored in the database; they
/// order correctly as strings, which is all the views need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: i64,
    pub category_id: i64,
    pub title: String,
    pub detail: String,
    pub due_date: Option<NaiveDate>,
    pub created_at: String,
    pub completed_at: Option<String>,
    pub deleted_at: Option<String>,
}

impl TodoItem {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input for creating an item. The due date is raw user text and is
/// normalized against the owning category's kind on insert.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub category_id: i64,
    pub title: String,
    pub detail: String,
    pub due_date: Option<String>,
}

impl NewTodo {
    pub fn new(category_id: i64, title: &str, detail: &str, due_date: Option<&str>) -> Self {
        NewTodo {
            category_id,
            title: title.to_string(),
            detail: detail.to_string(),
            due_date: due_date.map(str::to_string),
        }
    }
}

/// Window into the completed-item history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Non-positive limits fall back to `default_limit`, negative offsets to zero.
    pub fn normalized(limit: i64, offset: i64, default_limit: i64) -> Self {
        Page {
            limit: if limit > 0 { limit } else { default_limit },
            offset: offset.max(0),
        }
    }
}
