//! INSERT-OR-UPDATE statement builder.

use super::{column_list, require_table, value_list, Statement};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::fields::{FieldSet, Params};

/// Builds an INSERT that updates the existing row on conflict.
///
/// With an explicit key the key column is taken from the key value, placed
/// last in both the column and VALUES lists, and the statement yields the
/// key. Without one every data field is inserted and updated, and the
/// statement only reports affected rows.
pub struct Upsert<'a> {
    dialect: &'a dyn Dialect,
    table: &'a str,
    data: Option<&'a dyn Params>,
    key: Option<&'a dyn Params>,
}

impl<'a> Upsert<'a> {
    /// Starts an upsert into `table`.
    #[must_use]
    pub fn into(dialect: &'a dyn Dialect, table: &'a str) -> Self {
        Self {
            dialect,
            table,
            data: None,
            key: None,
        }
    }

    /// Sets the row values.
    #[must_use]
    pub fn data(mut self, data: &'a dyn Params) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the conflict key. Must carry exactly one field.
    #[must_use]
    pub fn key(mut self, key: &'a dyn Params) -> Self {
        self.key = Some(key);
        self
    }

    /// Builds the statement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty table name, missing
    /// data, a key with other than one field, or no columns to write, and
    /// [`Error::UnsupportedOperation`] when the dialect has no upsert form.
    pub fn build(&self) -> Result<Statement> {
        require_table(self.table)?;
        let data = self
            .data
            .ok_or_else(|| Error::invalid("upsert requires data"))?;

        let Some(key) = self.key else {
            let columns = data.fields();
            if columns.is_empty() {
                return Err(Error::invalid("upsert requires at least one column"));
            }
            let clause = self.dialect.upsert_clause(None, &columns)?;
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({}) {clause}",
                self.dialect.quote_identifier(self.table),
                column_list(self.dialect, &columns),
                value_list(&columns),
            );
            return Ok(Statement::new(sql, data.param_set(&columns)));
        };

        let key_fields = key.fields();
        let [key_name] = key_fields.as_slice() else {
            return Err(Error::invalid(format!(
                "upsert key must have exactly one field, got {}",
                key_fields.len()
            )));
        };

        let columns = data
            .fields()
            .without(|name| name.eq_ignore_ascii_case(key_name));
        let clause = self.dialect.upsert_clause(Some(key_name.as_str()), &columns)?;

        let mut params = data.param_set(&columns);
        params.merge(&key.param_set(&key_fields))?;

        let all = FieldSet::new(columns.iter().chain(key_fields.iter()));
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) {clause}",
            self.dialect.quote_identifier(self.table),
            column_list(self.dialect, &all),
            value_list(&all),
        );
        Ok(Statement::new(sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;
    use crate::params::ParamSet;
    use crate::value::SqlValue;

    fn data() -> ParamSet {
        ParamSet::new()
            .with("Id", 5_i64)
            .and_then(|p| p.with("Url", "/a"))
            .unwrap()
    }

    fn key() -> ParamSet {
        ParamSet::new().with("Id", 5_i64).unwrap()
    }

    #[test]
    fn test_upsert_with_key_sqlite() {
        let (data, key) = (data(), key());
        let stmt = Upsert::into(DialectKind::Sqlite.policy(), "Menu")
            .data(&data)
            .key(&key)
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"Menu\" (\"Url\", \"Id\") VALUES (@Url, @Id) \
             ON CONFLICT (\"Id\") DO UPDATE SET \"Url\" = @Url RETURNING \"Id\""
        );
        let names: Vec<&str> = stmt.params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Url", "Id"]);
        assert_eq!(stmt.params.get("Id"), Some(&SqlValue::Int(5)));
    }

    #[test]
    fn test_upsert_with_key_mysql() {
        let (data, key) = (data(), key());
        let stmt = Upsert::into(DialectKind::MySql.policy(), "Menu")
            .data(&data)
            .key(&key)
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `Menu` (`Url`, `Id`) VALUES (@Url, @Id) \
             ON DUPLICATE KEY UPDATE `Id` = LAST_INSERT_ID(`Id`), `Url` = @Url; SELECT LAST_INSERT_ID()"
        );
    }

    #[test]
    fn test_upsert_without_key() {
        let data = data();
        let stmt = Upsert::into(DialectKind::MySql.policy(), "Menu")
            .data(&data)
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `Menu` (`Id`, `Url`) VALUES (@Id, @Url) \
             ON DUPLICATE KEY UPDATE `Id` = @Id, `Url` = @Url"
        );
    }

    #[test]
    fn test_upsert_unsupported_dialects() {
        let data = data();
        let err = Upsert::into(DialectKind::SqlServer.policy(), "Menu")
            .data(&data)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { .. }));

        let err = Upsert::into(DialectKind::Postgres.policy(), "Menu")
            .data(&data)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { .. }));
    }

    #[test]
    fn test_upsert_key_must_be_single_field() {
        let data = data();
        let key = ParamSet::new()
            .with("A", 1_i64)
            .and_then(|p| p.with("B", 2_i64))
            .unwrap();
        let err = Upsert::into(DialectKind::Sqlite.policy(), "Menu")
            .data(&data)
            .key(&key)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
