//! # quill-core
//!
//! Dialect-aware statement synthesis and offset pagination planning.
//!
//! This crate is the synchronous half of quill. It never talks to a
//! database; it turns entity shapes and parameter bags into SQL text plus an
//! ordered parameter set, and it rewrites caller SELECT statements into the
//! COUNT and windowed statements a pager needs.
//!
//! This crate provides:
//! - Field introspection over statically declared field descriptors
//!   (see `#[derive(Record)]` in `quill-derive`)
//! - A closed set of SQL dialect strategies behind the [`Dialect`] trait
//! - Builders for SELECT, INSERT, UPSERT, UPDATE and DELETE
//! - A parenthesis-aware scanner that rewrites a projection to `COUNT(..)`
//!   and strips a top-level `ORDER BY`
//! - Page window arithmetic
//!
//! ## Building statements
//!
//! ```rust
//! use quill_core::builder::Update;
//! use quill_core::dialect::DialectKind;
//! use quill_core::ParamSet;
//!
//! let filter = ParamSet::new().with("Id", 7_i64).unwrap();
//! let data = ParamSet::new().with("Url", "/home").unwrap();
//!
//! let stmt = Update::table(DialectKind::MySql.policy(), "Menu")
//!     .filter(&filter)
//!     .data(&data)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(stmt.sql, "UPDATE `Menu` SET `Url` = @Url WHERE `Id` = @Id");
//! ```
//!
//! ## Counting a caller query
//!
//! ```rust
//! use quill_core::rewrite::count_query;
//! use quill_core::DialectKind;
//!
//! let sql = count_query(
//!     "SELECT id, name FROM t ORDER BY name ASC",
//!     DialectKind::Postgres.policy(),
//! )
//! .unwrap();
//! assert_eq!(sql, "SELECT COUNT(*) FROM t");
//! ```

pub mod builder;
pub mod dialect;
mod error;
pub mod fields;
pub mod page;
pub mod params;
pub mod rewrite;
pub mod row;
mod scan;
pub mod schema;
pub mod value;

pub use builder::Statement;
pub use dialect::{Dialect, DialectKind, Syntax};
pub use error::{Error, Result};
pub use fields::{fields_of, FieldDescriptor, FieldSet, Params, Record};
pub use page::{Page, PagePlan, PageWindow};
pub use params::ParamSet;
pub use row::{FromRow, Row};
pub use schema::{Entity, EntityMeta};
pub use value::{FromSqlValue, SqlValue, ToSqlValue};

/// Column name treated as the primary key when an entity declares none.
pub const PRIMARY_KEY_CONVENTION: &str = "Id";
