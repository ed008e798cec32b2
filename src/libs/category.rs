use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use std::fmt;

/// Whether the items of a category carry a due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum CategoryKind {
    /// Items are scheduled on a calendar date.
    Dated,
    /// Items never carry a due date.
    Plain,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Dated => "dated",
            CategoryKind::Plain => "plain",
        }
    }

    /// Parses the stored column value. Anything unknown reads as `dated`.
    pub fn from_db(value: &str) -> Self {
        match value {
            "plain" => CategoryKind::Plain,
            _ => CategoryKind::Dated,
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for CategoryKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CategoryKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(CategoryKind::from_db)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: CategoryKind,
    pub sort_order: i64,
}

impl Category {
    pub fn is_dated(&self) -> bool {
        self.kind == CategoryKind::Dated
    }
}
