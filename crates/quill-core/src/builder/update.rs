//! UPDATE statement builder.

use super::{conditions, require_table, Statement};
use crate::dialect::{assignments, Dialect};
use crate::error::{Error, Result};
use crate::fields::Params;

/// Builds `UPDATE <table> SET ... WHERE ...`.
///
/// Columns named by the filter are dropped from the SET list, so a column
/// never appears in both roles. Data parameters come first, filter
/// parameters after.
pub struct Update<'a> {
    dialect: &'a dyn Dialect,
    table: &'a str,
    data: Option<&'a dyn Params>,
    filter: Option<&'a dyn Params>,
}

impl<'a> Update<'a> {
    /// Starts an UPDATE of `table`.
    #[must_use]
    pub fn table(dialect: &'a dyn Dialect, table: &'a str) -> Self {
        Self {
            dialect,
            table,
            data: None,
            filter: None,
        }
    }

    /// Sets the new column values.
    #[must_use]
    pub fn data(mut self, data: &'a dyn Params) -> Self {
        self.data = Some(data);
        self
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
    /// Returns [`Error::InvalidArgument`] for an empty table name, an empty
    /// SET list or an empty filter.
    pub fn build(&self) -> Result<Statement> {
        require_table(self.table)?;
        let data = self
            .data
            .ok_or_else(|| Error::invalid("update requires data"))?;
        let filter = self
            .filter
            .ok_or_else(|| Error::invalid("update requires a filter"))?;

        let filter_fields = filter.fields();
        if filter_fields.is_empty() {
            return Err(Error::invalid("filter must have at least one field"));
        }
        let columns = data
            .fields()
            .without(|name| filter_fields.contains_ignore_case(name));
        if columns.is_empty() {
            return Err(Error::invalid("update requires at least one column to set"));
        }

        let mut params = data.param_set(&columns);
        params.merge(&filter.param_set(&filter_fields))?;

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            self.dialect.quote_identifier(self.table),
            assignments(self.dialect, &columns),
            conditions(self.dialect, &filter_fields)
        );
        Ok(Statement::new(sql, params))
    }
}
