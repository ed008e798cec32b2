//! Typed failures surfaced by the store.
//!
//! Every operation on [`TodoStore`](crate::libs::store::TodoStore) reports one
//! of four failure classes so callers can decide how to react:
//!
//! - **Connection**: the backing file cannot be opened or the worker is gone.
//!   Fatal to the session, never retried.
//! - **Query**: a single statement failed. Carries the engine's diagnostic.
//! - **Validation**: caller-supplied arguments violate an invariant. Raised
//!   before anything is written.
//! - **Migration**: the on-disk layout could not be brought to the current
//!   generation. Triggers the restore path during import.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn migration(msg: impl Into<String>) -> Self {
        Self::Migration(msg.into())
    }

    /// Re-labels any failure raised while bringing the schema up to date.
    pub fn into_migration(self) -> Self {
        match self {
            Self::Migration(_) => self,
            other => Self::migration(other.to_string()),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Query(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
