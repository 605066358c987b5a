//! SQLite dialect implementation.

use super::postgres::conflict_update;
use super::{assignments, Dialect, IdFragment, Syntax};
use crate::error::{Error, Result};
use crate::fields::FieldSet;

/// SQLite dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    // SQLite accepts [name] for compatibility with SQL Server.
    fn syntax(&self) -> Syntax {
        Syntax {
            bracket_identifiers: true,
            backslash_escapes: false,
        }
    }

    fn last_insert_id(&self, _key: &str) -> IdFragment {
        IdFragment::Suffix(String::from("; SELECT last_insert_rowid()"))
    }

    fn upsert_clause(&self, key: Option<&str>, update: &FieldSet) -> Result<String> {
        match key {
            Some(key) => Ok(conflict_update(self, key, update)),
            // A target-less ON CONFLICT needs SQLite 3.35+.
            None if update.is_empty() => Err(Error::invalid("upsert requires at least one column")),
            None => Ok(format!(
                "ON CONFLICT DO UPDATE SET {}",
                assignments(self, update)
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_dialect() {
        let dialect = SqliteDialect::new();
        assert_eq!(dialect.name(), "sqlite");
        assert_eq!(dialect.quote_identifier("Menu"), "\"Menu\"");
        assert_eq!(dialect.placeholder(1), "?");
        assert_eq!(dialect.limit_offset_clause(), "LIMIT @limit OFFSET @offset");
        assert_eq!(
            dialect.last_insert_id("Id"),
            IdFragment::Suffix(String::from("; SELECT last_insert_rowid()"))
        );
    }

    #[test]
    fn test_sqlite_upsert_with_key() {
        let clause = SqliteDialect
            .upsert_clause(Some("Id"), &FieldSet::new(["Url"]))
            .unwrap();
        assert_eq!(
            clause,
            "ON CONFLICT (\"Id\") DO UPDATE SET \"Url\" = @Url RETURNING \"Id\""
        );
    }

    #[test]
    fn test_sqlite_upsert_without_key() {
        let clause = SqliteDialect
            .upsert_clause(None, &FieldSet::new(["Url"]))
            .unwrap();
        assert_eq!(clause, "ON CONFLICT DO UPDATE SET \"Url\" = @Url");
    }
}
