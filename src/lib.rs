//! # todo004 - local-first todo store
//!
//! Keeps categories and todo items in a single SQLite file and exposes them
//! to the command line through an immutable, versioned snapshot.
//!
//! ## Features
//!
//! - **Schema lifecycle**: detects empty, partial, current and legacy files
//!   and brings them to the current layout, seeding default categories
//! - **Todo management**: dated and plain categories, completion, discard,
//!   restore and erase with soft-delete semantics
//! - **Derived views**: calendar buckets, date spans, orderings and title
//!   suggestions computed from the snapshot
//! - **Backup/restore**: whole-file export, and import that puts the previous
//!   database back when the replacement cannot be adopted
//!
//! ## Usage
//!
//! ```rust,no_run
//! use todo004::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
