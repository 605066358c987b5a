//! SELECT statement builder.

use super::{conditions, require_table, Statement};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::fields::Params;
use crate::params::ParamSet;

/// Builds `SELECT * FROM <table> [WHERE ...]`, optionally limited to one row.
pub struct Select<'a> {
    dialect: &'a dyn Dialect,
    table: &'a str,
    filter: Option<&'a dyn Params>,
    first: bool,
}

impl<'a> Select<'a> {
    /// Starts a SELECT over `table`.
    #[must_use]
    pub fn from(dialect: &'a dyn Dialect, table: &'a str) -> Self {
        Self {
            dialect,
            table,
            filter: None,
            first: false,
        }
    }

    /// Restricts the rows to those whose columns equal the filter's values.
    #[must_use]
    pub fn filter(mut self, filter: &'a dyn Params) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Limits the result to a single row.
    #[must_use]
    pub const fn first(mut self) -> Self {
        self.first = true;
        self
    }

    /// Builds the statement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty table name or a filter
    /// with no fields.
    pub fn build(&self) -> Result<Statement> {
        require_table(self.table)?;

        let top = self.first && !self.dialect.supports_limit();
        let mut sql = String::from(if top { "SELECT TOP 1 * FROM " } else { "SELECT * FROM " });
        sql.push_str(&self.dialect.quote_identifier(self.table));

        let mut params = ParamSet::new();
        if let Some(filter) = self.filter {
            let fields = filter.fields();
            if fields.is_empty() {
                return Err(Error::invalid("filter must have at least one field"));
            }
            sql.push_str(" WHERE ");
            sql.push_str(&conditions(self.dialect, &fields));
            params = filter.param_set(&fields);
        }

        if self.first && !top {
            sql.push_str(" LIMIT 1");
        }

        Ok(Statement::new(sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;
    use crate::value::SqlValue;

    #[test]
    fn test_select_all() {
        let stmt = Select::from(DialectKind::Postgres.policy(), "Menu")
            .build()
            .unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM \"Menu\"");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_select_where_joins_with_and() {
        let filter = ParamSet::new()
            .with("ParentId", 1_i64)
            .and_then(|p| p.with("Url", "#"))
            .unwrap();
        let stmt = Select::from(DialectKind::MySql.policy(), "Menu")
            .filter(&filter)
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM `Menu` WHERE `ParentId` = @ParentId AND `Url` = @Url"
        );
        assert_eq!(stmt.params.get("ParentId"), Some(&SqlValue::Int(1)));
    }

    #[test]
    fn test_select_first_uses_limit_or_top() {
        let key = ParamSet::new().with("Id", 2_i64).unwrap();
        let sqlite = Select::from(DialectKind::Sqlite.policy(), "Menu")
            .filter(&key)
            .first()
            .build()
            .unwrap();
        assert_eq!(sqlite.sql, "SELECT * FROM \"Menu\" WHERE \"Id\" = @Id LIMIT 1");

        let sqlserver = Select::from(DialectKind::SqlServer.policy(), "Menu")
            .filter(&key)
            .first()
            .build()
            .unwrap();
        assert_eq!(sqlserver.sql, "SELECT TOP 1 * FROM [Menu] WHERE [Id] = @Id");
    }

    #[test]
    fn test_select_rejects_empty_table_and_filter() {
        let sqlite = DialectKind::Sqlite.policy();
        assert!(Select::from(sqlite, "").build().is_err());
        let empty = ParamSet::new();
        assert!(matches!(
            Select::from(sqlite, "Menu").filter(&empty).build(),
            Err(Error::InvalidArgument(_))
        ));
    }
}
