//! # quill
//!
//! Async CRUD and offset pagination for plain structs, on top of the
//! statement synthesis in [`quill_core`].
//!
//! This crate provides:
//! - [`Database`] with entity reads, inserts, upserts, updates and deletes
//! - Offset pagination with page-link metadata, including two-table joins
//! - [`Executor`], the seam between statements and a driver
//! - [`SqliteExecutor`], an sqlx-backed executor with an ambient transaction
//!
//! ## Quick Start
//!
//! ```ignore
//! use quill::{Database, DialectKind, Options, ParamSet, SqliteExecutor};
//! use quill_derive::Entity;
//!
//! #[derive(Debug, Entity)]
//! #[entity(table = "Menu")]
//! struct Menu {
//!     #[field(name = "Id")]
//!     id: i64,
//!     #[field(name = "Url")]
//!     url: String,
//! }
//!
//! async fn example() -> quill::Result<()> {
//!     let executor = SqliteExecutor::connect("sqlite::memory:").await?;
//!     let db = Database::with_options(executor, Options::new(DialectKind::Sqlite));
//!
//!     let id = db.insert::<Menu>(&Menu { id: 0, url: "/home".into() }).await?;
//!     let menu = db.get::<Menu>(id).await?;
//!
//!     let page = db
//!         .page::<Menu>("SELECT * FROM Menu ORDER BY Id", 1, &ParamSet::new(), 10)
//!         .await?;
//!     assert!(!page.has_previous);
//!     Ok(())
//! }
//! ```
//!
//! Deriving requires a direct dependency on `quill-core`, which the derive
//! output names.

mod database;
mod error;
mod executor;
mod options;
mod sqlite;
mod tables;

pub use database::Database;
pub use error::{Error, Result};
pub use executor::Executor;
pub use options::Options;
pub use sqlite::SqliteExecutor;
pub use tables::{DeclaredTableNames, TableNameResolver};

pub use quill_core;
pub use quill_core::{
    DialectKind, Entity, FromRow, Page, ParamSet, Params, Row, SqlValue, Statement,
};
