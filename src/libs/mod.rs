//! Domain types and application services.
//!
//! - **Models**: [`category`], [`todo`], date handling in [`dates`]
//! - **Derived views**: [`calendar`], [`sort`], [`snapshot`]
//! - **Store facade**: [`store`] ties the database layer to snapshots
//! - **Infrastructure**: [`config`], [`data_storage`], [`error`], [`messages`]
//! - **Presentation**: table rendering in [`view`]

pub mod calendar;
pub mod category;
pub mod config;
pub mod data_storage;
pub mod dates;
pub mod error;
pub mod messages;
pub mod snapshot;
pub mod sort;
pub mod store;
pub mod todo;
pub mod view;
