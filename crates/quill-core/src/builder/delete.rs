//! DELETE statement builder.

use super::{conditions, require_table, Statement};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::fields::Params;

/// Builds `DELETE FROM <table> WHERE ...`.
///
/// A filter is mandatory; there is no unfiltered delete.
pub struct Delete<'a> {
    dialect: &'a dyn Dialect,
    table: &'a str,
    filter: Option<&'a dyn Params>,
}

impl<'a> Delete<'a> {
    /// Starts a DELETE over `table`.
    #[must_use]
    pub fn from(dialect: &'a dyn Dialect, table: &'a str) -> Self {
        Self {
            dialect,
            table,
            filter: None,
        }
    }

    /// Sets the row filter.
    #[must_use]
    pub fn filter(mut self, filter: &'a dyn Params) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Builds the statement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty table name or a
    /// missing or empty filter.
    pub fn build(&self) -> Result<Statement> {
        require_table(self.table)?;
        let filter = self
            .filter
            .ok_or_else(|| Error::invalid("delete requires a filter"))?;
        let fields = filter.fields();
        if fields.is_empty() {
            return Err(Error::invalid("filter must have at least one field"));
        }

        let sql = format!(
            "DELETE FROM {} WHERE {}",
            self.dialect.quote_identifier(self.table),
            conditions(self.dialect, &fields)
        );
        Ok(Statement::new(sql, filter.param_set(&fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;
    use crate::params::ParamSet;

    #[test]
    fn test_delete_by_filter() {
        let filter = ParamSet::new()
            .with("ParentId", 4_i64)
            .and_then(|p| p.with("Hidden", true))
            .unwrap();
        let stmt = Delete::from(DialectKind::Postgres.policy(), "Menu")
            .filter(&filter)
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "DELETE FROM \"Menu\" WHERE \"ParentId\" = @ParentId AND \"Hidden\" = @Hidden"
        );
        assert_eq!(stmt.params.len(), 2);
    }

    #[test]
    fn test_delete_requires_filter() {
        let sqlite = DialectKind::Sqlite.policy();
        assert!(Delete::from(sqlite, "Menu").build().is_err());
        let empty = ParamSet::new();
        assert!(matches!(
            Delete::from(sqlite, "Menu").filter(&empty).build(),
            Err(Error::InvalidArgument(_))
        ));
    }
}
