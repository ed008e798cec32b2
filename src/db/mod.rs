//! Persistence layer for todo004.
//!
//! Everything that touches the SQLite file lives here. The layers stack from
//! the connection up:
//!
//! - [`db`]: the gateway owning the single connection
//! - [`query`]: typed row mapping with a column-count check per query
//! - [`worker`]: the thread that owns the gateway and serves requests one at a time
//! - [`migrations`]: schema detection, legacy migration and default seeding
//! - [`categories`] and [`todos`]: one statement (or one transaction) per user action
//! - [`backup`]: whole-file export and import with rollback
//!
//! ## Usage
//!
//! ```rust,no_run
//! use todo004::db::{db::Db, migrations::SchemaManager, todos::Todos};
//!
//! let mut db = Db::at("todo004.db");
//! db.open()?;
//! SchemaManager::new().ensure_schema(db.conn_mut()?)?;
//! let active = Todos::new(db.conn()?).list_active()?;
//! # Ok::<(), todo004::libs::error::StoreError>(())
//! ```
//!
//! ## Schema (generation 2)
//!
//! ```text
//! app_meta    (key, value)
//! ms_category (id, name, category_type, sort_order, created_at, deleted_at)
//! tr_todo     (id, id_category -> ms_category.id, title, detail, do_at,
//!              created_at, completed_at, deleted_at)
//! ```

/// Connection gateway.
pub mod db;

/// Typed query definitions.
pub mod query;

/// Single-threaded request/response access to the gateway.
pub mod worker;

/// Schema lifecycle: detection, legacy migration, seeding.
pub mod migrations;

/// Category CRUD, kind changes, cascading soft-delete and reordering.
pub mod categories;

/// Todo item CRUD, completion toggling, discard/restore and title search.
pub mod todos;

/// Export and import of the whole database file.
pub mod backup;
