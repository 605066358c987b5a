//! PostgreSQL dialect implementation.

use super::{assignments, Dialect, IdFragment};
use crate::error::{Error, Result};
use crate::fields::FieldSet;

/// PostgreSQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn last_insert_id(&self, key: &str) -> IdFragment {
        IdFragment::Suffix(format!(" RETURNING {}", self.quote_identifier(key)))
    }

    fn upsert_clause(&self, key: Option<&str>, update: &FieldSet) -> Result<String> {
        // ON CONFLICT DO UPDATE requires a conflict target.
        let Some(key) = key else {
            return Err(Error::UnsupportedOperation {
                dialect: self.name(),
                operation: "upsert without a key",
            });
        };
        Ok(conflict_update(self, key, update))
    }
}

/// `ON CONFLICT ("k") DO UPDATE SET ... RETURNING "k"`, shared with SQLite.
pub(super) fn conflict_update(dialect: &dyn Dialect, key: &str, update: &FieldSet) -> String {
    let quoted = dialect.quote_identifier(key);
    let set = if update.is_empty() {
        format!("{quoted} = EXCLUDED.{quoted}")
    } else {
        assignments(dialect, update)
    };
    format!("ON CONFLICT ({quoted}) DO UPDATE SET {set} RETURNING {quoted}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_dialect() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.name(), "postgres");
        assert_eq!(dialect.quote_identifier("Menu"), "\"Menu\"");
        assert_eq!(dialect.placeholder(2), "$2");
        assert_eq!(
            dialect.last_insert_id("Id"),
            IdFragment::Suffix(String::from(" RETURNING \"Id\""))
        );
    }

    #[test]
    fn test_postgres_upsert() {
        let clause = PostgresDialect
            .upsert_clause(Some("Id"), &FieldSet::new(["Url"]))
            .unwrap();
        assert_eq!(
            clause,
            "ON CONFLICT (\"Id\") DO UPDATE SET \"Url\" = @Url RETURNING \"Id\""
        );
    }

    #[test]
    fn test_postgres_upsert_with_nothing_to_update() {
        let clause = PostgresDialect
            .upsert_clause(Some("Id"), &FieldSet::default())
            .unwrap();
        assert_eq!(
            clause,
            "ON CONFLICT (\"Id\") DO UPDATE SET \"Id\" = EXCLUDED.\"Id\" RETURNING \"Id\""
        );
    }

    #[test]
    fn test_postgres_upsert_without_key_is_unsupported() {
        let err = PostgresDialect
            .upsert_clause(None, &FieldSet::new(["Url"]))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation { dialect: "postgres", .. }));
    }
}
