//! INSERT statement builder.

use super::{column_list, require_table, value_list, Statement};
use crate::dialect::{Dialect, IdFragment};
use crate::error::{Error, Result};
use crate::fields::Params;
use crate::PRIMARY_KEY_CONVENTION;

/// Builds an INSERT that yields the new row's key.
///
/// The key column itself is never inserted; the database assigns it.
pub struct Insert<'a> {
    dialect: &'a dyn Dialect,
    table: &'a str,
    data: Option<&'a dyn Params>,
    key: &'a str,
}

impl<'a> Insert<'a> {
    /// Starts an INSERT into `table`.
    #[must_use]
    pub fn into(dialect: &'a dyn Dialect, table: &'a str) -> Self {
        Self {
            dialect,
            table,
            data: None,
            key: PRIMARY_KEY_CONVENTION,
        }
    }

    /// Sets the row values.
    #[must_use]
    pub fn data(mut self, data: &'a dyn Params) -> Self {
        self.data = Some(data);
        self
    }

    /// Overrides the key column (default `Id`, matched case-insensitively).
    #[must_use]
    pub const fn key(mut self, key: &'a str) -> Self {
        self.key = key;
        self
    }

    /// Builds the statement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty table name or when no
    /// column is left once the key is excluded.
    pub fn build(&self) -> Result<Statement> {
        require_table(self.table)?;
        let data = self
            .data
            .ok_or_else(|| Error::invalid("insert requires data"))?;
        let columns = data
            .fields()
            .without(|name| name.eq_ignore_ascii_case(self.key));
        if columns.is_empty() {
            return Err(Error::invalid("insert requires at least one column"));
        }

        let table = self.dialect.quote_identifier(self.table);
        let names = column_list(self.dialect, &columns);
        let values = value_list(&columns);
        let sql = match self.dialect.last_insert_id(self.key) {
            IdFragment::Suffix(suffix) => {
                format!("INSERT INTO {table} ({names}) VALUES ({values}){suffix}")
            }
            IdFragment::BeforeValues(output) => {
                format!("INSERT INTO {table} ({names}) {output} VALUES ({values})")
            }
        };
        Ok(Statement::new(sql, data.param_set(&columns)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;
    use crate::params::ParamSet;

    fn menu() -> ParamSet {
        ParamSet::new()
            .with("id", 0_i64)
            .and_then(|p| p.with("Url", "/a"))
            .and_then(|p| p.with("Name", "A"))
            .unwrap()
    }

    #[test]
    fn test_insert_per_dialect() {
        let data = menu();
        let expected = [
            (
                DialectKind::MySql,
                "INSERT INTO `Menu` (`Url`, `Name`) VALUES (@Url, @Name); SELECT LAST_INSERT_ID()",
            ),
            (
                DialectKind::Postgres,
                "INSERT INTO \"Menu\" (\"Url\", \"Name\") VALUES (@Url, @Name) RETURNING \"Id\"",
            ),
            (
                DialectKind::SqlServer,
                "INSERT INTO [Menu] ([Url], [Name]) OUTPUT INSERTED.[Id] VALUES (@Url, @Name)",
            ),
            (
                DialectKind::Sqlite,
                "INSERT INTO \"Menu\" (\"Url\", \"Name\") VALUES (@Url, @Name); SELECT last_insert_rowid()",
            ),
        ];
        for (kind, sql) in expected {
            let stmt = Insert::into(kind.policy(), "Menu")
                .data(&data)
                .build()
                .unwrap();
            assert_eq!(stmt.sql, sql, "{kind}");
            assert!(!stmt.params.contains("id"));
            assert_eq!(stmt.params.len(), 2);
        }
    }

    #[test]
    fn test_insert_custom_key() {
        let data = ParamSet::new()
            .with("MenuId", 1_i64)
            .and_then(|p| p.with("Url", "/"))
            .unwrap();
        let stmt = Insert::into(DialectKind::Postgres.policy(), "Menu")
            .data(&data)
            .key("MenuId")
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"Menu\" (\"Url\") VALUES (@Url) RETURNING \"MenuId\""
        );
    }

    #[test]
    fn test_insert_rejects_key_only_data() {
        let data = ParamSet::new().with("Id", 1_i64).unwrap();
        let err = Insert::into(DialectKind::Sqlite.policy(), "Menu")
            .data(&data)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
