//! Statement builders.
//!
//! Each builder takes a [`Dialect`], a table name and one or more
//! [`Params`](crate::Params) values, and produces a [`Statement`]: SQL text
//! with `@name` placeholders plus the ordered [`ParamSet`] that binds them.
//!
//! Conditions are always joined with `AND`.
//!
//! ```rust
//! use quill_core::builder::{Delete, Select};
//! use quill_core::{DialectKind, ParamSet};
//!
//! let sqlserver = DialectKind::SqlServer.policy();
//! let key = ParamSet::new().with("Id", 3_i64).unwrap();
//!
//! let get = Select::from(sqlserver, "Menu").filter(&key).first().build().unwrap();
//! assert_eq!(get.sql, "SELECT TOP 1 * FROM [Menu] WHERE [Id] = @Id");
//!
//! let delete = Delete::from(sqlserver, "Menu").filter(&key).build().unwrap();
//! assert_eq!(delete.sql, "DELETE FROM [Menu] WHERE [Id] = @Id");
//! ```

mod delete;
mod insert;
mod select;
mod update;
mod upsert;

pub use delete::Delete;
pub use insert::Insert;
pub use select::Select;
pub use update::Update;
pub use upsert::Upsert;

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::fields::FieldSet;
use crate::params::{bind_named, ParamSet};
use crate::value::SqlValue;

/// SQL text with named placeholders and the values bound to them.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Statement text using `@name` placeholders.
    pub sql: String,
    /// Bound parameters.
    pub params: ParamSet,
}

impl Statement {
    /// Creates a statement from raw SQL and parameters.
    pub fn new(sql: impl Into<String>, params: ParamSet) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Rewrites the placeholders for `dialect` and returns the positional
    /// values in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when a placeholder has no binding.
    pub fn bind(&self, dialect: &dyn Dialect) -> Result<(String, Vec<SqlValue>)> {
        bind_named(&self.sql, &self.params, dialect)
    }
}

pub(crate) fn require_table(table: &str) -> Result<()> {
    if table.trim().is_empty() {
        return Err(Error::invalid("table name must not be empty"));
    }
    Ok(())
}

/// `"a" = @a AND "b" = @b`
pub(crate) fn conditions(dialect: &dyn Dialect, columns: &FieldSet) -> String {
    columns
        .iter()
        .map(|c| format!("{} = @{c}", dialect.quote_identifier(c)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// `"a", "b"`
pub(crate) fn column_list(dialect: &dyn Dialect, columns: &FieldSet) -> String {
    columns
        .iter()
        .map(|c| dialect.quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `@a, @b`
pub(crate) fn value_list(columns: &FieldSet) -> String {
    columns
        .iter()
        .map(|c| format!("@{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}
